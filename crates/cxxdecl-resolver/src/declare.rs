//! Constructors pairing declarations with their owned scopes.
//!
//! The external grammar calls these as it opens class bodies, namespaces,
//! and enums; each wires the new scope's back-pointer and access-label
//! default before any member is seen.

use cxxdecl_core::{
    Decl, DeclId, EnumType, Identifier, NameComponent, NamespaceDecl, ScopeId, StructKind,
    StructType,
};

use crate::session::Session;

impl Session {
    /// Create a struct/class/union with a fresh member scope under `parent`.
    ///
    /// The type starts incomplete; call [`Session::complete_struct`] when the
    /// closing brace is processed. For a class template, `parent` is the
    /// template-parameter scope.
    pub fn new_struct_type(
        &mut self,
        kind: StructKind,
        ident: Identifier,
        parent: ScopeId,
    ) -> DeclId {
        let scope = self.new_scope(Some(parent), NameComponent::new(ident.simple_name()));
        self.scope_mut(scope).current_vis = kind.default_visibility();
        let id = self.new_decl(Decl::Struct(StructType::new(kind, ident, scope)));
        self.scope_mut(scope).struct_type = Some(id);
        id
    }

    /// Mark a struct type's body as closed.
    pub fn complete_struct(&mut self, decl: DeclId) {
        if let Some(st) = self.decl_mut(decl).as_struct_mut() {
            st.incomplete = false;
        }
    }

    /// Create a namespace with a fresh scope under `parent`.
    pub fn new_namespace(&mut self, ident: Identifier, parent: ScopeId) -> DeclId {
        let scope = self.new_scope(Some(parent), NameComponent::new(ident.simple_name()));
        self.new_decl(Decl::Namespace(NamespaceDecl::new(ident, scope)))
    }

    /// Create an enum with a fresh scope for its enumerators under `parent`.
    pub fn new_enum_type(&mut self, ident: Identifier, parent: ScopeId, is_scoped: bool) -> DeclId {
        let scope = self.new_scope(Some(parent), NameComponent::new(ident.simple_name()));
        self.new_decl(Decl::Enum(EnumType::new(ident, scope, is_scoped)))
    }
}
