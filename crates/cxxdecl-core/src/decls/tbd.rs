//! Deferred type placeholders.

use crate::Identifier;

/// A to-be-determined type: a placeholder for an identifier that cannot be
/// resolved yet because it names something depending on an unsubstituted
/// template parameter (`T::value_type`).
///
/// Purely forwarding storage; it holds no derived data. Resolution is
/// re-attempted on demand and during substitution, collapsing the
/// placeholder once enough context exists.
#[derive(Debug, Clone)]
pub struct TbdType {
    /// The deferred reference.
    pub ident: Identifier,
    /// Re-entrancy marker for `resolve_tbd`.
    pub resolve_guard: bool,
}

impl TbdType {
    /// Create a placeholder for an identifier.
    pub fn new(ident: Identifier) -> Self {
        Self {
            ident,
            resolve_guard: false,
        }
    }
}
