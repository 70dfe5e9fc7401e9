//! Lexical scopes: symbol tables with inheritance and `using` fallback.
//!
//! A scope is a namespace body, a class body, a function body, or the
//! implicit template-parameter scope wrapping a template declaration. It
//! indexes its declarations by kind and answers name lookups in a fixed
//! order: own maps, then each `using` target non-recursively, then each
//! base-class scope non-recursively, then the parent chain recursively.
//! First match wins; there is no cross-candidate ambiguity detection.

use cxxdecl_core::{
    Decl, DeclId, NameComponent, ScopeId, SemanticError, TemplateParameterList, Visibility,
};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use crate::session::Session;
use crate::template::SubstMap;

/// Tri-state memo for the fully-specified computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Memo {
    #[default]
    Unknown,
    InProgress,
    Known(bool),
}

/// What kind of scope this is.
#[derive(Debug, Clone, Default)]
pub enum ScopeKind {
    /// A namespace, class, or function body.
    #[default]
    Normal,
    /// The implicit scope introduced by `template<...>`, carrying the formal
    /// parameters of the declaration it wraps.
    Template(TemplateParameterList),
}

impl ScopeKind {
    /// Whether this is a template-parameter scope.
    pub fn is_template(&self) -> bool {
        matches!(self, ScopeKind::Template(_))
    }

    /// The formal parameters, when this is a template-parameter scope.
    pub fn template_params(&self) -> Option<&TemplateParameterList> {
        match self {
            ScopeKind::Template(params) => Some(params),
            ScopeKind::Normal => None,
        }
    }
}

/// An ordered group of function overloads sharing one name.
#[derive(Debug, Clone)]
pub struct FunctionGroup {
    /// The shared name.
    pub name: String,
    /// The overload instances, in declaration order.
    pub instances: Vec<DeclId>,
}

impl FunctionGroup {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }
}

/// A lexical scope.
///
/// Parent links and the struct back-pointer are non-owning ids; a scope is
/// owned by whatever declared it (its struct type, namespace, or a transient
/// instantiation site). The `using` set is likewise non-owning and carries no
/// DAG assumption: lookups through it never recurse, which is what keeps
/// mutual `using` edges from looping.
#[derive(Debug, Default)]
pub struct Scope {
    /// The enclosing scope, if any.
    pub parent: Option<ScopeId>,
    /// This scope's own name component (empty for the global and for
    /// template-parameter scopes).
    pub name: NameComponent,
    /// Normal or template-parameter scope.
    pub kind: ScopeKind,
    /// The running access-label cursor, stamped onto member declarations.
    pub current_vis: Visibility,
    /// The struct type whose body this scope is, if any.
    pub struct_type: Option<DeclId>,
    /// Every declaration in insertion order.
    pub declarations: Vec<DeclId>,
    /// Types by local name, including the implicit registration of
    /// class/struct/union/enum names.
    pub types: FxHashMap<String, DeclId>,
    /// Variables by name.
    pub variables: FxHashMap<String, DeclId>,
    /// Enumerator values by name.
    pub enum_values: FxHashMap<String, DeclId>,
    /// Function overload groups by name.
    pub functions: FxHashMap<String, FunctionGroup>,
    /// Template declarations by name.
    pub templates: FxHashMap<String, DeclId>,
    /// Nested namespaces by name.
    pub namespaces: FxHashMap<String, DeclId>,
    /// Scopes imported wholesale by `using namespace`.
    pub using: IndexSet<ScopeId>,
    /// Cache of instantiations, keyed by structural equality of the actual
    /// argument list.
    pub instantiations: Vec<(TemplateParameterList, ScopeId)>,
    /// Memo for the fully-specified computation.
    pub fully_specified: Memo,
    /// Re-entrancy marker for scope substitution.
    pub subst_guard: bool,
}

impl Scope {
    pub(crate) fn new(parent: Option<ScopeId>, name: NameComponent) -> Self {
        Self {
            parent,
            name,
            current_vis: Visibility::Public,
            ..Self::default()
        }
    }
}

impl Session {
    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Move the access-label cursor (`public:` / `protected:` / `private:`).
    pub fn set_current_vis(&mut self, scope: ScopeId, vis: Visibility) {
        self.scope_mut(scope).current_vis = vis;
    }

    /// Add a declaration to a scope, in order, and index it by kind.
    pub fn add_declaration(&mut self, scope: ScopeId, decl: DeclId) {
        let vis = self.scope(scope).current_vis;
        if let Some(inst) = self.decl_mut(decl).as_instance_mut() {
            inst.vis = vis;
        }
        self.scope_mut(scope).declarations.push(decl);
        self.handle_declaration(scope, decl);
    }

    /// Register an enumerator value in a scope.
    pub fn add_enum_value(&mut self, scope: ScopeId, inst: DeclId) {
        let vis = self.scope(scope).current_vis;
        let name = match self.decl_mut(inst).as_instance_mut() {
            Some(instance) => {
                instance.vis = vis;
                instance.simple_name().to_owned()
            }
            None => return,
        };
        if !name.is_empty() {
            self.scope_mut(scope).enum_values.insert(name, inst);
        }
    }

    /// Index a declaration into the right map(s) for its kind.
    ///
    /// Also used to import a single symbol resolved by a `using` declaration.
    pub(crate) fn handle_declaration(&mut self, scope: ScopeId, decl: DeclId) {
        match self.decl(decl) {
            Decl::Typedef(td) => {
                let target = td.ty;
                self.define_typedef_type(scope, decl);
                if self.decl(target).is_extension_type() {
                    self.define_extension_type(scope, target);
                }
            }
            Decl::Struct(_) | Decl::Enum(_) => {
                self.define_extension_type(scope, decl);
            }
            Decl::Instance(_) => {
                self.handle_instance(scope, decl);
            }
            Decl::Namespace(_) => {
                self.define_namespace(scope, decl);
            }
            Decl::Using(_) => {
                self.add_using(scope, decl);
            }
            Decl::TemplateParam(param) => {
                let name = param.simple_name().to_owned();
                self.scope_mut(scope).types.insert(name, decl);
            }
            _ => {}
        }
    }

    fn handle_instance(&mut self, scope: ScopeId, decl: DeclId) {
        // Record where the instance was declared; resolution and printing
        // start from here.
        let ident = {
            let inst = self.decl_mut(decl).as_instance_mut().expect("instance");
            inst.ident.set_native_scope(scope);
            inst.ident.clone()
        };
        let name = ident.simple_name().to_owned();
        if name.is_empty() {
            return;
        }

        // An out-of-line definition (`void Foo::bar()` at namespace level)
        // belongs to the scope its qualified name resolves to, not here.
        let home = self.ident_scope_quiet(&ident, scope);
        if home != Some(scope) {
            return;
        }

        let (ty, is_template) = {
            let inst = self.decl(decl).as_instance().expect("instance");
            (inst.ty, inst.is_template())
        };
        if matches!(self.decl(self.deref_proxy(ty)), Decl::Function(_)) {
            let group = self
                .scope_mut(scope)
                .functions
                .entry(name.clone())
                .or_insert_with(|| FunctionGroup::new(name.clone()));
            group.instances.push(decl);
        } else {
            self.scope_mut(scope).variables.insert(name.clone(), decl);
        }

        if is_template && self.find_template(scope, &name, true).is_none() {
            self.scope_mut(scope).templates.insert(name, decl);
        }
    }

    /// Register a typedef.
    ///
    /// Redefinitions are not performed: a conflicting redeclaration is
    /// reported and the existing entry is kept, but a typedef that renames
    /// the previous definition (or aliases an equivalent type) passes
    /// silently.
    pub fn define_typedef_type(&mut self, scope: ScopeId, td: DeclId) {
        let (name, target, span, is_template, template_scope) = {
            let typedef = self.decl(td).as_typedef().expect("typedef");
            (
                typedef.simple_name().to_owned(),
                typedef.ty,
                typedef.ident.span(),
                typedef.is_template(),
                typedef.template_scope,
            )
        };
        if name.is_empty() {
            return;
        }

        if let Some(&existing) = self.scope(scope).types.get(&name) {
            let existing_alias = self.decl(existing).as_typedef().map(|t| t.ty);
            let compatible = existing == target
                || matches!(existing_alias, Some(other) if self.types_equivalent(other, target));
            if !compatible {
                self.diagnostics_mut()
                    .error(SemanticError::ConflictingDeclaration { name: name.clone(), span });
            }
        } else {
            self.scope_mut(scope).types.insert(name.clone(), td);
        }

        if is_template {
            let nonempty = template_scope
                .and_then(|ts| self.scope(ts).kind.template_params())
                .is_some_and(|params| !params.is_empty());
            if nonempty {
                self.register_template(scope, name, td);
            }
        }
    }

    /// Register a class/struct/union/enum under its local name.
    ///
    /// A later extension-type declaration always replaces an earlier one (a
    /// complete definition thereby wins over a forward declaration); a
    /// class-key mismatch is reported first. A collision with a non-extension
    /// type is reported and the existing entry kept, unless the existing
    /// entry is a typedef naming this very type.
    pub fn define_extension_type(&mut self, scope: ScopeId, ty: DeclId) {
        let (name, span) = match self.decl(ty) {
            Decl::Struct(st) => (st.simple_name().to_owned(), st.ident.span()),
            Decl::Enum(en) => (en.simple_name().to_owned(), en.ident.span()),
            _ => return,
        };
        if name.is_empty() {
            return;
        }

        match self.scope(scope).types.get(&name).copied() {
            Some(existing) if existing != ty => {
                if self.decl(existing).is_extension_type() {
                    let declared = self.decl(ty).kind_name();
                    let previous = self.decl(existing).kind_name();
                    if declared != previous {
                        self.diagnostics_mut().error(SemanticError::ExtensionKindMismatch {
                            name: name.clone(),
                            declared: declared.to_owned(),
                            previous: previous.to_owned(),
                            span,
                        });
                    }
                    self.scope_mut(scope).types.insert(name.clone(), ty);
                } else {
                    let aliases_this = self
                        .decl(existing)
                        .as_typedef()
                        .is_some_and(|td| td.ty == ty);
                    if !aliases_this {
                        self.diagnostics_mut()
                            .error(SemanticError::ConflictingDeclaration { name: name.clone(), span });
                    }
                }
            }
            Some(_) => {}
            None => {
                self.scope_mut(scope).types.insert(name.clone(), ty);
            }
        }

        if self.struct_is_template(ty) {
            let nonempty = self
                .struct_template_params(ty)
                .is_some_and(|params| !params.is_empty());
            if nonempty {
                self.register_template(scope, name, ty);
            }
        }
    }

    /// Register a template by name. An earlier registration survives unless
    /// it was an incomplete forward reference (or not a type at all), in
    /// which case the newer definition replaces it.
    fn register_template(&mut self, scope: ScopeId, name: String, decl: DeclId) {
        if let Some(&old) = self.scope(scope).templates.get(&name) {
            let replace = match self.decl(old) {
                Decl::Struct(st) => st.incomplete,
                Decl::Typedef(_) => false,
                _ => true,
            };
            if replace {
                self.scope_mut(scope).templates.insert(name, decl);
            }
        } else {
            self.scope_mut(scope).templates.insert(name, decl);
        }
    }

    /// Register a namespace. Inline namespaces get an implicit `using` edge.
    pub fn define_namespace(&mut self, scope: ScopeId, ns: DeclId) {
        let (name, ns_scope, is_inline) = {
            let namespace = self.decl(ns).as_namespace().expect("namespace");
            (
                namespace.simple_name().to_owned(),
                namespace.scope,
                namespace.is_inline,
            )
        };
        self.scope_mut(scope).namespaces.insert(name, ns);
        if is_inline {
            self.scope_mut(scope).using.insert(ns_scope);
        }
    }

    /// Apply a `using` directive or declaration to a scope.
    ///
    /// `using namespace N` records a non-owning edge to the target scope;
    /// `using N::x` re-indexes the resolved symbol here. Either form warns
    /// and proceeds when the target does not resolve.
    pub fn add_using(&mut self, scope: ScopeId, using_decl: DeclId) {
        let (ident, full_namespace) = {
            let using = self.decl(using_decl).as_using().expect("using");
            (using.ident.clone(), using.full_namespace)
        };
        if full_namespace {
            match self.resolve_scope(&ident, scope) {
                Some(target) => {
                    self.scope_mut(scope).using.insert(target);
                }
                None => {
                    let name = self.ident_local_name(&ident);
                    tracing::debug!(namespace = %name, "using directive did not resolve");
                    self.diagnostics_mut().warning(SemanticError::UndefinedNamespace {
                        name,
                        span: ident.span(),
                    });
                }
            }
        } else {
            match self.resolve_symbol(&ident, scope) {
                Some(symbol) => self.handle_declaration(scope, symbol),
                None => {
                    let name = self.ident_local_name(&ident);
                    self.diagnostics_mut().warning(SemanticError::UnknownUsingSymbol {
                        name,
                        span: ident.span(),
                    });
                }
            }
        }
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find a type by local name.
    pub fn find_type(&self, scope: ScopeId, name: &str, recurse: bool) -> Option<DeclId> {
        if let Some(&id) = self.scope(scope).types.get(name) {
            return Some(id);
        }
        for used in self.scope(scope).using.iter().copied().collect::<Vec<_>>() {
            if let Some(id) = self.find_type(used, name, false) {
                return Some(id);
            }
        }
        for base_scope in self.base_scopes(scope) {
            if let Some(id) = self.find_type(base_scope, name, false) {
                return Some(id);
            }
        }
        if recurse {
            if let Some(parent) = self.scope(scope).parent {
                return self.find_type(parent, name, true);
            }
        }
        None
    }

    /// Find a type by local name, substituting each hit on the way out.
    ///
    /// This is the lookup used while a substitution pass is in flight, so a
    /// hit on a formal template parameter answers with its actual argument.
    pub(crate) fn find_type_subst(
        &mut self,
        scope: ScopeId,
        name: &str,
        subst: &mut SubstMap,
        recurse: bool,
    ) -> Option<DeclId> {
        if let Some(&id) = self.scope(scope).types.get(name) {
            return Some(self.substitute_decl(id, subst, scope));
        }
        let usings: Vec<ScopeId> = self.scope(scope).using.iter().copied().collect();
        for used in usings {
            if let Some(id) = self.find_type_subst(used, name, subst, false) {
                return Some(id);
            }
        }
        for base_scope in self.base_scopes(scope) {
            if let Some(id) = self.find_type_subst(base_scope, name, subst, false) {
                return Some(id);
            }
        }
        if recurse {
            if let Some(parent) = self.scope(scope).parent {
                return self.find_type_subst(parent, name, subst, true);
            }
        }
        None
    }

    /// Find any symbol (function group leader, type, variable, or
    /// enumerator) by local name.
    ///
    /// The enclosing struct answers for its own injected class name. For an
    /// overloaded function this returns the first overload; the whole group
    /// is available via [`Session::find_function_group`].
    pub fn find_symbol(&self, scope: ScopeId, name: &str, recurse: bool) -> Option<DeclId> {
        let s = self.scope(scope);
        if let Some(struct_type) = s.struct_type {
            if name == s.name.name() {
                return Some(struct_type);
            }
        }
        if let Some(group) = s.functions.get(name) {
            if let Some(&first) = group.instances.first() {
                return Some(first);
            }
        }
        if let Some(&id) = s.types.get(name) {
            return Some(id);
        }
        if let Some(&id) = s.variables.get(name) {
            return Some(id);
        }
        if let Some(&id) = s.enum_values.get(name) {
            return Some(id);
        }
        for used in self.scope(scope).using.iter().copied().collect::<Vec<_>>() {
            if let Some(id) = self.find_symbol(used, name, false) {
                return Some(id);
            }
        }
        for base_scope in self.base_scopes(scope) {
            if let Some(id) = self.find_symbol(base_scope, name, false) {
                return Some(id);
            }
        }
        if recurse {
            if let Some(parent) = self.scope(scope).parent {
                return self.find_symbol(parent, name, true);
            }
        }
        None
    }

    /// Find a template declaration by local name.
    pub fn find_template(&self, scope: ScopeId, name: &str, recurse: bool) -> Option<DeclId> {
        if let Some(&id) = self.scope(scope).templates.get(name) {
            return Some(id);
        }
        for used in self.scope(scope).using.iter().copied().collect::<Vec<_>>() {
            if let Some(id) = self.find_template(used, name, false) {
                return Some(id);
            }
        }
        for base_scope in self.base_scopes(scope) {
            if let Some(id) = self.find_template(base_scope, name, false) {
                return Some(id);
            }
        }
        if recurse {
            if let Some(parent) = self.scope(scope).parent {
                return self.find_template(parent, name, true);
            }
        }
        None
    }

    /// Find a nested scope by local name: a namespace, or the body of a
    /// class/enum reachable by that name (typedefs unwrapped, deferred
    /// placeholders re-resolved).
    pub fn find_scope(&mut self, scope: ScopeId, name: &str, recurse: bool) -> Option<ScopeId> {
        if let Some(&ns) = self.scope(scope).namespaces.get(name) {
            if let Some(namespace) = self.decl(ns).as_namespace() {
                return Some(namespace.scope);
            }
        }

        let mut ty = self.scope(scope).types.get(name).copied();
        if let Some(t) = ty {
            ty = Some(self.reduce_to_extension(t, scope));
        } else if self.scope(scope).struct_type.is_some() {
            for base_scope in self.base_scopes(scope) {
                if let Some(found) = self.find_type(base_scope, name, false) {
                    ty = Some(self.reduce_to_extension(found, scope));
                    break;
                }
            }
        }

        if let Some(t) = ty {
            match self.decl(self.deref_proxy(t)) {
                Decl::Struct(st) => return Some(st.scope),
                Decl::Enum(en) => return Some(en.scope),
                _ => {}
            }
        }

        let usings: Vec<ScopeId> = self.scope(scope).using.iter().copied().collect();
        for used in usings {
            if let Some(found) = self.find_scope(used, name, false) {
                return Some(found);
            }
        }
        if recurse {
            if let Some(parent) = self.scope(scope).parent {
                return self.find_scope(parent, name, true);
            }
        }
        None
    }

    /// Find a nested scope by local name while a substitution pass is in
    /// flight.
    pub(crate) fn find_scope_subst(
        &mut self,
        scope: ScopeId,
        name: &str,
        subst: &mut SubstMap,
        recurse: bool,
    ) -> Option<ScopeId> {
        if let Some(&ns) = self.scope(scope).namespaces.get(name) {
            if let Some(namespace) = self.decl(ns).as_namespace() {
                return Some(namespace.scope);
            }
        }
        let found = self.find_type_subst(scope, name, subst, recurse)?;
        let reduced = self.reduce_to_extension(found, scope);
        match self.decl(self.deref_proxy(reduced)) {
            Decl::Struct(st) => Some(st.scope),
            Decl::Enum(en) => Some(en.scope),
            _ => None,
        }
    }

    /// The full overload group for a function name in this scope alone.
    pub fn find_function_group(&self, scope: ScopeId, name: &str) -> Option<&FunctionGroup> {
        self.scope(scope).functions.get(name)
    }

    /// Unwrap typedefs and re-resolve deferred placeholders until an actual
    /// named type (or an unresolvable placeholder) remains.
    pub(crate) fn reduce_to_extension(&mut self, ty: DeclId, current: ScopeId) -> DeclId {
        let mut id = self.deref_proxy(ty);
        loop {
            match self.decl(id) {
                Decl::Typedef(td) => {
                    id = self.deref_proxy(td.ty);
                }
                Decl::Tbd(_) => {
                    let resolved = self.resolve_tbd(id, current);
                    if resolved == id {
                        break;
                    }
                    id = resolved;
                }
                _ => break,
            }
        }
        id
    }

    /// The scopes of this scope's base classes, in declaration order.
    pub(crate) fn base_scopes(&self, scope: ScopeId) -> Vec<ScopeId> {
        let Some(struct_type) = self.scope(scope).struct_type else {
            return Vec::new();
        };
        let Some(st) = self.decl(struct_type).as_struct() else {
            return Vec::new();
        };
        st.derivation
            .iter()
            .filter_map(|b| self.decl(self.deref_proxy(b.base)).as_struct())
            .map(|base| base.scope)
            .collect()
    }
}
