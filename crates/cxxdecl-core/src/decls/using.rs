//! `using` directives and declarations.

use crate::Identifier;

/// A `using` directive (`using namespace N;`) or declaration (`using N::x;`).
#[derive(Debug, Clone)]
pub struct UsingDirective {
    /// What is being imported.
    pub ident: Identifier,
    /// True for `using namespace N` (import the whole scope), false for a
    /// single-symbol `using N::x`.
    pub full_namespace: bool,
}

impl UsingDirective {
    /// Import an entire namespace.
    pub fn namespace(ident: Identifier) -> Self {
        Self {
            ident,
            full_namespace: true,
        }
    }

    /// Import a single symbol.
    pub fn symbol(ident: Identifier) -> Self {
        Self {
            ident,
            full_namespace: false,
        }
    }
}
