//! Client-side id minting.
//!
//! Sides and matches exist locally before the tournament is saved. They
//! receive snowflake ids with the temporary bit set; the server's
//! authoritative copy replaces them on reconcile.

use darts_knockout_core::{MatchId, SideId};
use snowflaked::Generator;

/// Mints ids for entities created locally.
#[derive(Debug)]
pub struct IdGenerator {
    inner: Generator,
}

impl IdGenerator {
    /// Creates a new `IdGenerator` using `instance` as the generator
    /// instance component.
    pub fn new(instance: u16) -> Self {
        Self {
            inner: Generator::new(instance),
        }
    }

    pub fn side_id(&mut self) -> SideId {
        SideId::temporary(self.inner.generate())
    }

    pub fn match_id(&mut self) -> MatchId {
        MatchId::temporary(self.inner.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_temporary() {
        let mut ids = IdGenerator::new(0);

        let first = ids.match_id();
        let second = ids.match_id();

        assert!(first.is_temporary());
        assert!(second.is_temporary());
        assert_ne!(first, second);

        assert!(ids.side_id().is_temporary());
    }
}
