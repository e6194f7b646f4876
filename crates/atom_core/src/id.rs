//! Process-unique identifier for atoms.
//!
//! Used to de-duplicate dependencies; carries no other meaning.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ATOM_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(u64);

impl AtomId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ATOM_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "atom#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<AtomId> = (0..100).map(|_| AtomId::next()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn display_uses_raw_value() {
        let id = AtomId::next();
        assert_eq!(id.to_string(), format!("atom#{}", id.as_raw()));
    }
}
