//! Typed identifiers for every entity the tournament tree refers to.
//!
//! Ids for sides and matches are minted client-side before the server has
//! seen the entity. Such ids carry the [`TEMPORARY_BIT`] and are replaced
//! wholesale when the authoritative server copy is reconciled back into
//! local state.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Set on ids that were minted locally and have not been persisted yet.
pub const TEMPORARY_BIT: u64 = 1 << 63;

macro_rules! id {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Creates an id marked as locally minted.
            #[inline]
            pub fn temporary(id: u64) -> Self {
                Self(id | TEMPORARY_BIT)
            }

            /// Returns `true` if the id has not been persisted by the server.
            #[inline]
            pub fn is_temporary(&self) -> bool {
                self.0 & TEMPORARY_BIT != 0
            }
        }

        impl Display for $name {
            #[inline]
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl AsRef<u64> for $name {
            #[inline]
            fn as_ref(&self) -> &u64 {
                &self.0
            }
        }

        impl PartialEq<u64> for $name {
            #[inline]
            fn eq(&self, other: &u64) -> bool {
                self.0 == *other
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = <u64 as FromStr>::Err;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse::<u64>()?))
            }
        }
    };
}

id!(TournamentId);
id!(SideId);
id!(PlayerId);
id!(MatchId);
id!(SaygId);
id!(TeamId);
id!(SeasonId);
id!(DivisionId);
id!(PhotoId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_bit() {
        let id = MatchId::temporary(17);
        assert!(id.is_temporary());
        assert_ne!(id, MatchId::from(17));

        let id = MatchId::from(17);
        assert!(!id.is_temporary());
    }

    #[test]
    fn test_parse() {
        assert_eq!("42".parse::<SideId>().unwrap(), SideId(42));
        assert!("x".parse::<SideId>().is_err());
    }
}
