//! The parsing session: arenas, interning, and cross-cutting queries.
//!
//! A [`Session`] owns every declaration and scope produced during one
//! header-parsing run. All graph edges are ids into its arenas, so "the same
//! type" always means "the same [`DeclId`]"; the intern table maps a
//! canonical type key to the declaration that owns it, deduplicating
//! structurally identical instantiations the way a global type registry
//! would, but scoped to the run and torn down with it.

use cxxdecl_core::{
    Decl, DeclId, Diagnostic, Diagnostics, Identifier, NameComponent, ScopeId, TbdType,
    TemplateParameterList,
};
use rustc_hash::FxHashMap;

use crate::scope::{Memo, Scope, ScopeKind};

/// One header-parsing run: the declaration and scope arenas, the global
/// scope, the type-intern table, and the diagnostic sink.
#[derive(Debug)]
pub struct Session {
    decls: Vec<Decl>,
    scopes: Vec<Scope>,
    interned: FxHashMap<String, DeclId>,
    diagnostics: Diagnostics,
    global: ScopeId,
}

impl Session {
    /// Create a session with an empty global scope.
    pub fn new() -> Self {
        let mut session = Self {
            decls: Vec::new(),
            scopes: Vec::new(),
            interned: FxHashMap::default(),
            diagnostics: Diagnostics::new(),
            global: ScopeId(0),
        };
        session.global = session.new_scope(None, NameComponent::new(""));
        session
    }

    /// The global scope.
    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    /// The collected diagnostics.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Drain the collected diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain()
    }

    // ==========================================================================
    // Arena access
    // ==========================================================================

    /// Read a declaration.
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub(crate) fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    /// Read a scope.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Store a declaration.
    pub fn new_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    /// Create a new lexical scope.
    pub fn new_scope(&mut self, parent: Option<ScopeId>, name: NameComponent) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent, name));
        id
    }

    /// Create a template-parameter scope.
    ///
    /// The formal parameters are registered as declarations of the scope,
    /// which is what makes `T` resolvable inside the template body and what
    /// makes the scope (and everything declared under it) report
    /// not-fully-specified.
    pub fn new_template_scope(
        &mut self,
        parent: ScopeId,
        params: TemplateParameterList,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let mut scope = Scope::new(Some(parent), NameComponent::new(""));
        scope.kind = ScopeKind::Template(params.clone());
        self.scopes.push(scope);
        let formals: Vec<DeclId> = params.iter().collect();
        for formal in formals {
            let name = match self.decl(formal).as_template_param() {
                Some(param) => param.simple_name().to_owned(),
                None => continue,
            };
            let scope = self.scope_mut(id);
            scope.declarations.push(formal);
            scope.types.insert(name, formal);
        }
        id
    }

    // ==========================================================================
    // Interning
    // ==========================================================================

    /// Get the interned builtin type of the given name, creating it on first
    /// use. `int` is one declaration everywhere in the session.
    pub fn simple_type(&mut self, name: &str) -> DeclId {
        let key = format!("simple:{name}");
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = self.new_decl(Decl::Simple(cxxdecl_core::SimpleType::new(name)));
        self.interned.insert(key, id);
        id
    }

    /// Intern a type declaration.
    ///
    /// Returns the previously recorded declaration with the same canonical
    /// key, if any, so structurally identical instantiations collapse to one
    /// id; otherwise records this one and returns it. Declarations without a
    /// canonical key pass through unchanged.
    pub fn intern_type(&mut self, id: DeclId) -> DeclId {
        let id = self.deref_proxy(id);
        let Some(key) = self.type_key(id) else {
            return id;
        };
        if let Some(&existing) = self.interned.get(&key) {
            return existing;
        }
        self.interned.insert(key, id);
        id
    }

    /// Get or create the interned deferred placeholder for an identifier.
    pub fn intern_tbd(&mut self, ident: Identifier) -> DeclId {
        let id = self.new_decl(Decl::Tbd(TbdType::new(ident)));
        self.intern_type(id)
    }

    /// Chase through filled proxies to the actual declaration.
    pub fn deref_proxy(&self, mut id: DeclId) -> DeclId {
        while let Decl::Proxy(proxy) = self.decl(id) {
            match proxy.actual {
                Some(actual) if actual != id => id = actual,
                _ => break,
            }
        }
        id
    }

    fn type_key(&self, id: DeclId) -> Option<String> {
        match self.decl(id) {
            Decl::Simple(simple) => Some(format!("simple:{}", simple.name)),
            Decl::Struct(st) => Some(format!(
                "{}:{}",
                st.kind.keyword(),
                self.scope_fully_scoped_name(st.scope)
            )),
            Decl::Enum(en) => Some(format!("enum:{}", self.scope_fully_scoped_name(en.scope))),
            Decl::Tbd(tbd) => Some(format!("tbd:{}", self.ident_fully_scoped_name(&tbd.ident))),
            _ => None,
        }
    }

    // ==========================================================================
    // Structural comparison
    // ==========================================================================

    /// Chase through typedefs (and filled proxies) to the named type.
    pub fn unwrap_typedefs(&self, id: DeclId) -> DeclId {
        let mut id = self.deref_proxy(id);
        while let Decl::Typedef(td) = self.decl(id) {
            id = self.deref_proxy(td.ty);
        }
        id
    }

    /// Structural equality of two declarations.
    ///
    /// Interned kinds (structs, enums, simple types) compare by id; the
    /// structured kinds compare piecewise. This is the equality the
    /// instantiation caches key on.
    pub fn decl_structural_eq(&self, a: DeclId, b: DeclId) -> bool {
        let a = self.deref_proxy(a);
        let b = self.deref_proxy(b);
        if a == b {
            return true;
        }
        match (self.decl(a), self.decl(b)) {
            (Decl::Simple(x), Decl::Simple(y)) => x.name == y.name,
            (Decl::Typedef(x), Decl::Typedef(y)) => {
                x.ident == y.ident && self.decl_structural_eq(x.ty, y.ty)
            }
            (Decl::Tbd(x), Decl::Tbd(y)) => x.ident == y.ident,
            (Decl::Instance(x), Decl::Instance(y)) => {
                x.ident == y.ident && self.decl_structural_eq(x.ty, y.ty)
            }
            (Decl::Function(x), Decl::Function(y)) => {
                x.is_const_method == y.is_const_method
                    && x.flags == y.flags
                    && x.parameters.includes_ellipsis == y.parameters.includes_ellipsis
                    && x.parameters.parameters.len() == y.parameters.parameters.len()
                    && self.decl_structural_eq(x.return_type, y.return_type)
                    && x.parameters
                        .parameters
                        .iter()
                        .zip(y.parameters.parameters.iter())
                        .all(|(&p, &q)| self.decl_structural_eq(p, q))
            }
            // Structs, enums, template parameters and namespaces are unique
            // declarations; id equality above is the whole story.
            _ => false,
        }
    }

    /// Whether two typedef-unwrapped types name the same thing.
    pub fn types_equivalent(&self, a: DeclId, b: DeclId) -> bool {
        self.decl_structural_eq(self.unwrap_typedefs(a), self.unwrap_typedefs(b))
    }

    /// Structural equality of two template argument lists, pairwise and
    /// order-sensitive.
    pub fn param_lists_equal(
        &self,
        a: &TemplateParameterList,
        b: &TemplateParameterList,
    ) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| self.decl_structural_eq(x, y))
    }

    // ==========================================================================
    // Fully-specified queries
    // ==========================================================================

    /// Whether a scope contains no remaining dependency on an uninstantiated
    /// template parameter.
    ///
    /// Memoized per scope. A reentrant call while the answer is being
    /// computed returns `true` optimistically to break recursion on cyclic
    /// graphs; this is a tolerated approximation, not a proof.
    pub fn scope_fully_specified(&mut self, id: ScopeId) -> bool {
        match self.scope(id).fully_specified {
            Memo::Known(value) => return value,
            Memo::InProgress => return true,
            Memo::Unknown => {}
        }
        self.scope_mut(id).fully_specified = Memo::InProgress;

        let mut specified = true;
        if let Some(parent) = self.scope(id).parent {
            if !self.scope_fully_specified(parent) {
                specified = false;
            }
        }
        if specified {
            let decls = self.scope(id).declarations.clone();
            for decl in decls {
                if !self.decl_fully_specified(decl) {
                    specified = false;
                    break;
                }
            }
        }

        self.scope_mut(id).fully_specified = Memo::Known(specified);
        specified
    }

    /// Whether a declaration contains no remaining dependency on an
    /// uninstantiated template parameter.
    pub fn decl_fully_specified(&mut self, id: DeclId) -> bool {
        match self.decl(id) {
            Decl::Simple(_) | Decl::Using(_) => true,
            Decl::TemplateParam(_) | Decl::Tbd(_) => false,
            Decl::Proxy(proxy) => match proxy.actual {
                Some(actual) if actual != id => self.decl_fully_specified(actual),
                _ => false,
            },
            Decl::Typedef(td) => {
                if td.template_scope.is_some() {
                    return false;
                }
                let ty = td.ty;
                let ident = td.ident.clone();
                self.decl_fully_specified(ty) && self.ident_fully_specified(&ident)
            }
            Decl::Instance(inst) => {
                if inst.template_scope.is_some() {
                    return false;
                }
                let ty = inst.ty;
                let ident = inst.ident.clone();
                self.decl_fully_specified(ty) && self.ident_fully_specified(&ident)
            }
            Decl::Function(func) => {
                let ret = func.return_type;
                let params = func.parameters.parameters.clone();
                if !self.decl_fully_specified(ret) {
                    return false;
                }
                params.into_iter().all(|p| self.decl_fully_specified(p))
            }
            Decl::Struct(st) => {
                let scope = st.scope;
                let ident = st.ident.clone();
                self.scope_fully_specified(scope) && self.ident_fully_specified(&ident)
            }
            Decl::Enum(en) => {
                let scope = en.scope;
                self.scope_fully_specified(scope)
            }
            Decl::Namespace(ns) => {
                let scope = ns.scope;
                self.scope_fully_specified(scope)
            }
        }
    }

    /// Whether every template argument of every component is fully specified.
    pub fn ident_fully_specified(&mut self, ident: &Identifier) -> bool {
        for component in ident.names() {
            if let Some(templ) = component.templ() {
                if !self.params_fully_specified(&templ.clone()) {
                    return false;
                }
            }
        }
        true
    }

    /// Whether every parameter in the list is fully specified.
    pub fn params_fully_specified(&mut self, params: &TemplateParameterList) -> bool {
        let ids: Vec<DeclId> = params.iter().collect();
        ids.into_iter().all(|p| self.decl_fully_specified(p))
    }

    /// Whether any parameter in the list is a deferred placeholder.
    pub fn params_is_tbd(&self, params: &TemplateParameterList) -> bool {
        params
            .iter()
            .any(|p| matches!(self.decl(self.deref_proxy(p)), Decl::Tbd(_)))
    }

    // ==========================================================================
    // Naming
    // ==========================================================================

    /// A short display name for a declaration, used in diagnostics and when
    /// rendering template arguments.
    pub fn decl_name(&self, id: DeclId) -> String {
        match self.decl(id) {
            Decl::Simple(simple) => simple.name.clone(),
            Decl::Struct(st) => self.name_with_templ(st.ident.last()),
            Decl::Enum(en) => en.simple_name().to_owned(),
            Decl::Typedef(td) => td.simple_name().to_owned(),
            Decl::Tbd(tbd) => self.ident_local_name(&tbd.ident),
            Decl::Proxy(proxy) => match proxy.actual {
                Some(actual) if actual != id => self.decl_name(actual),
                _ => "<proxy>".to_owned(),
            },
            Decl::Function(_) => "<function>".to_owned(),
            Decl::Instance(inst) => inst.simple_name().to_owned(),
            Decl::Namespace(ns) => ns.simple_name().to_owned(),
            Decl::TemplateParam(param) => param.simple_name().to_owned(),
            Decl::Using(using) => self.ident_local_name(&using.ident),
        }
    }

    /// Render a template argument list as `a, b, c`.
    pub fn format_params(&self, params: &TemplateParameterList) -> String {
        params
            .iter()
            .map(|p| self.decl_name(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render a name component with its template arguments: `Foo` or
    /// `Foo<int, double>`.
    pub fn name_with_templ(&self, component: &NameComponent) -> String {
        match component.templ() {
            Some(templ) => format!("{}<{}>", component.name(), self.format_params(templ)),
            None => component.name().to_owned(),
        }
    }

    /// The scope's own name, without qualification.
    pub fn scope_simple_name(&self, id: ScopeId) -> &str {
        self.scope(id).name.name()
    }

    /// The scope's name qualified all the way from the global scope.
    ///
    /// Unnamed scopes (the global scope, template-parameter scopes) are
    /// skipped in the chain.
    pub fn scope_fully_scoped_name(&self, id: ScopeId) -> String {
        let mut parts = Vec::new();
        let mut cursor = Some(id);
        while let Some(scope_id) = cursor {
            let scope = self.scope(scope_id);
            if !scope.name.is_empty() {
                parts.push(self.name_with_templ(&scope.name));
            }
            cursor = scope.parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// The scope's name relative to another scope, or fully scoped when no
    /// vantage point is given.
    pub fn scope_local_name(&self, id: ScopeId, relative_to: Option<ScopeId>) -> String {
        let mut parts = Vec::new();
        let mut cursor = Some(id);
        while let Some(scope_id) = cursor {
            if Some(scope_id) == relative_to {
                break;
            }
            let scope = self.scope(scope_id);
            if !scope.name.is_empty() {
                parts.push(self.name_with_templ(&scope.name));
            }
            cursor = scope.parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// The identifier printed with minimal qualification: its own components,
    /// template arguments rendered.
    pub fn ident_local_name(&self, ident: &Identifier) -> String {
        ident
            .names()
            .iter()
            .map(|c| self.name_with_templ(c))
            .collect::<Vec<_>>()
            .join("::")
    }

    /// The identifier printed fully qualified. When the declaring scope has
    /// been recorded, qualification starts there; otherwise the components
    /// speak for themselves.
    pub fn ident_fully_scoped_name(&self, ident: &Identifier) -> String {
        let local = self.ident_local_name(ident);
        match ident.native_scope() {
            Some(scope) => {
                let prefix = self.scope_fully_scoped_name(scope);
                if prefix.is_empty() {
                    local
                } else {
                    format!("{prefix}::{local}")
                }
            }
            None => local,
        }
    }

    /// An identifier naming a struct fully qualified, built from its scope
    /// chain so template arguments survive as real argument lists.
    pub(crate) fn struct_fully_scoped_ident(&self, decl: DeclId) -> Identifier {
        let st = match self.decl(decl) {
            Decl::Struct(st) => st,
            _ => unreachable!("struct_fully_scoped_ident on a non-struct"),
        };
        let mut components = Vec::new();
        let mut cursor = Some(st.scope);
        while let Some(scope_id) = cursor {
            let scope = self.scope(scope_id);
            if !scope.name.is_empty() {
                components.push(scope.name.clone());
            }
            cursor = scope.parent;
        }
        components.reverse();
        if components.is_empty() {
            components.push(NameComponent::new(st.simple_name()));
        }
        Identifier::from_components(components, st.ident.span())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxdecl_core::{Span, StructKind};

    #[test]
    fn global_scope_exists() {
        let session = Session::new();
        let global = session.global_scope();
        assert!(session.scope(global).parent.is_none());
        assert_eq!(session.scope_simple_name(global), "");
    }

    #[test]
    fn simple_types_intern_by_name() {
        let mut session = Session::new();
        let a = session.simple_type("int");
        let b = session.simple_type("int");
        let c = session.simple_type("double");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn simple_types_are_fully_specified() {
        let mut session = Session::new();
        let int_ty = session.simple_type("int");
        assert!(session.decl_fully_specified(int_ty));
    }

    #[test]
    fn template_params_are_not_fully_specified() {
        let mut session = Session::new();
        let t = session.new_decl(Decl::TemplateParam(cxxdecl_core::ClassTemplateParam::new(
            Identifier::parse("T", Span::default()),
        )));
        assert!(!session.decl_fully_specified(t));
    }

    #[test]
    fn template_scope_registers_formals() {
        let mut session = Session::new();
        let global = session.global_scope();
        let t = session.new_decl(Decl::TemplateParam(cxxdecl_core::ClassTemplateParam::new(
            Identifier::parse("T", Span::default()),
        )));
        let tscope = session.new_template_scope(global, TemplateParameterList::new(vec![t]));

        assert!(session.scope(tscope).kind.is_template());
        assert_eq!(session.scope(tscope).types.get("T"), Some(&t));
        assert!(!session.scope_fully_specified(tscope));
        // The global scope itself stays fully specified.
        assert!(session.scope_fully_specified(global));
    }

    #[test]
    fn param_lists_compare_structurally() {
        let mut session = Session::new();
        let int_ty = session.simple_type("int");
        let double_ty = session.simple_type("double");

        let a = TemplateParameterList::new(vec![int_ty]);
        let b = TemplateParameterList::new(vec![int_ty]);
        let c = TemplateParameterList::new(vec![double_ty]);
        assert!(session.param_lists_equal(&a, &b));
        assert!(!session.param_lists_equal(&a, &c));
    }

    #[test]
    fn unwrap_typedefs_chases_chains() {
        let mut session = Session::new();
        let int_ty = session.simple_type("int");
        let td1 = session.new_decl(Decl::Typedef(cxxdecl_core::TypedefType::new(
            Identifier::parse("word", Span::default()),
            int_ty,
        )));
        let td2 = session.new_decl(Decl::Typedef(cxxdecl_core::TypedefType::new(
            Identifier::parse("word2", Span::default()),
            td1,
        )));
        assert_eq!(session.unwrap_typedefs(td2), int_ty);
        assert!(session.types_equivalent(td2, int_ty));
    }

    #[test]
    fn struct_names_qualify_through_scope_chain() {
        let mut session = Session::new();
        let global = session.global_scope();
        let ns_scope = session.new_scope(Some(global), NameComponent::new("game"));
        let st = session.new_struct_type(
            StructKind::Struct,
            Identifier::parse("Player", Span::default()),
            ns_scope,
        );
        let scope = session.decl(st).as_struct().unwrap().scope;
        assert_eq!(session.scope_fully_scoped_name(scope), "game::Player");
        let ident = session.struct_fully_scoped_ident(st);
        assert_eq!(session.ident_local_name(&ident), "game::Player");
    }

    #[test]
    fn deref_proxy_chases_filled_cells() {
        let mut session = Session::new();
        let int_ty = session.simple_type("int");
        let proxy = session.new_decl(Decl::Proxy(cxxdecl_core::TypeProxy::unfilled()));
        assert_eq!(session.deref_proxy(proxy), proxy);
        session
            .decl_mut(proxy)
            .as_proxy_mut()
            .unwrap()
            .fill(int_ty);
        assert_eq!(session.deref_proxy(proxy), int_ty);
    }
}
