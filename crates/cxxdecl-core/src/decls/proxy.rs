//! Deferred-resolution cells for recursive substitution.

use crate::DeclId;

/// A once-writable cell standing in for a type discovered to be substituting
/// itself. The recursive caller receives the proxy immediately; the outer
/// substitution fills `actual` once it completes, and readers chase through
/// it with `Session::deref_proxy`.
#[derive(Debug, Clone, Default)]
pub struct TypeProxy {
    /// The real type, once the cycle has unwound.
    pub actual: Option<DeclId>,
}

impl TypeProxy {
    /// Create an unfilled proxy.
    pub fn unfilled() -> Self {
        Self::default()
    }

    /// Fill the cell. Later fills are ignored; the first writer wins.
    pub fn fill(&mut self, actual: DeclId) {
        if self.actual.is_none() {
            self.actual = Some(actual);
        }
    }
}
