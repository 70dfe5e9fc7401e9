//! Typedefs and alias declarations.

use crate::{DeclId, Identifier, ScopeId};

/// A typedef or `using` alias: a name for another type.
///
/// An alias template (`template<class T> using X = ...`) carries the
/// template-parameter scope its formals live in.
#[derive(Debug, Clone)]
pub struct TypedefType {
    /// The alias name.
    pub ident: Identifier,
    /// The aliased type.
    pub ty: DeclId,
    /// The template-parameter scope, when this is an alias template.
    pub template_scope: Option<ScopeId>,
}

impl TypedefType {
    /// Create a typedef.
    pub fn new(ident: Identifier, ty: DeclId) -> Self {
        Self {
            ident,
            ty,
            template_scope: None,
        }
    }

    /// Attach a template-parameter scope, making this an alias template.
    pub fn with_template_scope(mut self, scope: ScopeId) -> Self {
        self.template_scope = Some(scope);
        self
    }

    /// The unqualified alias name.
    pub fn simple_name(&self) -> &str {
        self.ident.simple_name()
    }

    /// Whether this alias is templated.
    pub fn is_template(&self) -> bool {
        self.template_scope.is_some()
    }
}
