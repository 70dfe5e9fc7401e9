//! Formal template parameters.

use crate::{DeclId, Identifier};

/// A formal template type parameter: the `T` of `template<class T>`.
///
/// Never fully specified by definition; substitution replaces references to
/// it through the substitution map built at the instantiation site.
#[derive(Debug, Clone)]
pub struct ClassTemplateParam {
    /// The parameter name.
    pub ident: Identifier,
    /// Default argument, when declared (`template<class T = int>`).
    pub default: Option<DeclId>,
}

impl ClassTemplateParam {
    /// Create a template parameter.
    pub fn new(ident: Identifier) -> Self {
        Self {
            ident,
            default: None,
        }
    }

    /// Attach a default argument.
    pub fn with_default(mut self, default: DeclId) -> Self {
        self.default = Some(default);
        self
    }

    /// The parameter name.
    pub fn simple_name(&self) -> &str {
        self.ident.simple_name()
    }
}
