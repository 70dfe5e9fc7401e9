//! Enumeration types.

use crate::{Identifier, ScopeId};

/// An enumeration.
///
/// Owns a scope holding its enumerator instances. For unscoped enums the
/// caller additionally registers the enumerators in the enclosing scope via
/// `add_enum_value`.
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Declared name.
    pub ident: Identifier,
    /// The scope holding the enumerators.
    pub scope: ScopeId,
    /// Whether this is an `enum class` / `enum struct`.
    pub is_scoped: bool,
}

impl EnumType {
    /// Create an enum type.
    pub fn new(ident: Identifier, scope: ScopeId, is_scoped: bool) -> Self {
        Self {
            ident,
            scope,
            is_scoped,
        }
    }

    /// The unqualified declared name.
    pub fn simple_name(&self) -> &str {
        self.ident.simple_name()
    }
}
