//! The HTTP layer for talking to the backend.

use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use hyper::{body, client::HttpConnector, Body};
use hyper_tls::HttpsConnector;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Result;

/// A transport-level error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error {
    #[from]
    error: hyper::Error,
}

/// The underlying HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: hyper::Client<HttpsConnector<HttpConnector>>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send(&self, request: Request) -> Result<Response> {
        let request = request.into();

        let resp = self.inner.request(request).await.map_err(Error::from)?;

        Ok(Response(resp))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self {
            inner: hyper::Client::builder().build(HttpsConnector::new()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    uri: String,
    method: Method,
    headers: Vec<(&'static str, String)>,
    body: Option<String>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            uri: String::new(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    pub fn new(uri: String) -> Self {
        Self {
            inner: Request {
                uri,
                ..Default::default()
            },
        }
    }

    /// Sets the request method to `GET`.
    pub fn get(mut self) -> Self {
        self.inner.method = Method::GET;
        self
    }

    /// Sets the request method to `POST`.
    pub fn post(mut self) -> Self {
        self.inner.method = Method::POST;
        self
    }

    /// Sets the request method to `PUT`.
    pub fn put(mut self) -> Self {
        self.inner.method = Method::PUT;
        self
    }

    /// Sets the request method to `DELETE`.
    pub fn delete(mut self) -> Self {
        self.inner.method = Method::DELETE;
        self
    }

    /// Sets the request method to `PATCH`.
    pub fn patch(mut self) -> Self {
        self.inner.method = Method::PATCH;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.inner.uri.push_str(uri);
        self
    }

    /// Adds a header to the request.
    pub fn header<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: ToString,
    {
        self.inner.headers.push((key, value.to_string()));
        self
    }

    /// Uses `T` serialized as json as the request body.
    pub fn body<T>(mut self, body: &T) -> Self
    where
        T: Serialize,
    {
        self.inner.body = Some(serde_json::to_string(&body).unwrap());
        self.header(CONTENT_TYPE.as_str(), "application/json")
    }

    pub fn build(self) -> Request {
        self.inner
    }
}

impl From<RequestBuilder> for Request {
    fn from(req: RequestBuilder) -> Self {
        req.inner
    }
}

#[derive(Debug)]
pub struct Response(hyper::Response<Body>);

impl Response {
    pub fn status(&self) -> StatusCode {
        self.0.status()
    }

    /// Returns `true` if the response contains a 2xx status code.
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    pub async fn json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = body::to_bytes(self.0.into_body())
            .await
            .map_err(Error::from)?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl From<Request> for hyper::Request<Body> {
    fn from(request: Request) -> Self {
        let body = match request.body {
            Some(body) => Body::from(body),
            None => Body::empty(),
        };

        let mut builder = hyper::Request::builder()
            .uri(request.uri)
            .method(request.method);

        for (key, value) in request.headers {
            builder = builder.header(key, value);
        }

        builder.body(body).unwrap()
    }
}
