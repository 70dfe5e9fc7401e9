//! Arena handles for declarations and scopes.
//!
//! All graph edges in the declaration model are expressed as these ids into
//! the session-owned arenas. Parent links, struct back-pointers and
//! `native_scope` caches are therefore non-owning by construction; "the same
//! declaration" always means "the same id".

use std::fmt;

/// Handle to a declaration in the session's declaration arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub u32);

/// Handle to a scope in the session's scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub u32);

impl DeclId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ScopeId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_ordered_and_hashable() {
        use std::collections::HashSet;

        let a = DeclId(1);
        let b = DeclId(2);
        assert!(a < b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&DeclId(1)));
        assert!(!set.contains(&b));
    }

    #[test]
    fn display() {
        assert_eq!(DeclId(7).to_string(), "decl#7");
        assert_eq!(ScopeId(0).to_string(), "scope#0");
    }
}
