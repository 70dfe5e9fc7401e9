//! Resolution of qualified identifiers against the scope tree.
//!
//! An identifier like `A::B<T>::C` resolves segment by segment: the walk
//! starts at the identifier's recorded declaring scope (or the caller's
//! current scope), restarts at the global scope for a leading `::`, and
//! instantiates any intermediate segment that carries template arguments.
//! The final segment is delegated to the resolved scope's lookup method.

use cxxdecl_core::{Decl, DeclId, Identifier, NameComponent, ScopeId, SemanticError,
    TemplateParameterList};

use crate::session::Session;
use crate::template::SubstMap;

impl Session {
    /// Resolve the scope an identifier's *qualifier* names: every component
    /// but the last.
    ///
    /// Returns `None`, after reporting, when any segment fails to resolve
    /// to a known scope. For an unqualified identifier this is simply the
    /// starting scope.
    pub fn ident_scope(&mut self, ident: &Identifier, current: ScopeId) -> Option<ScopeId> {
        self.ident_scope_impl(ident, current, true)
    }

    /// Like [`Session::ident_scope`], but silent on failure. Used for probes
    /// whose failure is an answer, not a problem.
    pub(crate) fn ident_scope_quiet(
        &mut self,
        ident: &Identifier,
        current: ScopeId,
    ) -> Option<ScopeId> {
        self.ident_scope_impl(ident, current, false)
    }

    fn ident_scope_impl(
        &mut self,
        ident: &Identifier,
        current: ScopeId,
        report: bool,
    ) -> Option<ScopeId> {
        let names = ident.names();
        let mut scope = ident.native_scope().unwrap_or(current);
        let mut index = 0;
        if names[0].is_empty() {
            scope = self.global_scope();
            index = 1;
        }
        while index + 1 < names.len() {
            let component = names[index].clone();
            let Some(mut next) = self.find_scope(scope, component.name(), true) else {
                if report {
                    self.diagnostics_mut().error(SemanticError::UnknownScope {
                        name: component.name().to_owned(),
                        span: ident.span(),
                    });
                }
                return None;
            };
            if let Some(templ) = component.templ() {
                next = self.instantiate_scope(next, templ, scope);
            }
            scope = next;
            index += 1;
        }
        Some(scope)
    }

    /// Substitution-aware variant of the qualifier walk; always silent.
    fn ident_scope_subst(
        &mut self,
        ident: &Identifier,
        current: ScopeId,
        subst: &mut SubstMap,
    ) -> Option<ScopeId> {
        let names = ident.names();
        let mut scope = ident.native_scope().unwrap_or(current);
        let mut index = 0;
        if names[0].is_empty() {
            scope = self.global_scope();
            index = 1;
        }
        while index + 1 < names.len() {
            let component = names[index].clone();
            let mut next = self.find_scope_subst(scope, component.name(), subst, true)?;
            if let Some(templ) = component.templ() {
                next = self.instantiate_scope(next, templ, scope);
            }
            scope = next;
            index += 1;
        }
        Some(scope)
    }

    /// Resolve an identifier to a scope: the qualifier walk plus the final
    /// segment, instantiated when it carries template arguments.
    pub fn resolve_scope(&mut self, ident: &Identifier, current: ScopeId) -> Option<ScopeId> {
        let scope = self.ident_scope_quiet(ident, current)?;
        let last = ident.last().clone();
        let mut found = self.find_scope(scope, last.name(), true)?;
        if let Some(templ) = last.templ() {
            found = self.instantiate_scope(found, templ, scope);
        }
        Some(found)
    }

    /// Resolve an identifier to a type.
    ///
    /// A templated final segment looks up the template and instantiates it
    /// when the actual arguments can be fully specified now; otherwise the
    /// whole reference is wrapped in a deferred placeholder to be revisited
    /// once more context exists.
    pub fn resolve_type(&mut self, ident: &Identifier, current: ScopeId) -> Option<DeclId> {
        self.resolve_type_impl(ident, current, true)
    }

    pub(crate) fn resolve_type_quiet(
        &mut self,
        ident: &Identifier,
        current: ScopeId,
    ) -> Option<DeclId> {
        self.resolve_type_impl(ident, current, false)
    }

    fn resolve_type_impl(
        &mut self,
        ident: &Identifier,
        current: ScopeId,
        report: bool,
    ) -> Option<DeclId> {
        let scope = self.ident_scope_impl(ident, current, report)?;
        let last = ident.last().clone();
        match last.templ() {
            Some(args) => {
                let templ = self.find_template(scope, last.name(), true)?;
                if self.params_fully_specified(args) && self.template_decl_complete(templ) {
                    Some(self.instantiate_decl(templ, args, scope))
                } else {
                    Some(self.intern_tbd(ident.clone()))
                }
            }
            None => self.find_type(scope, last.name(), true),
        }
    }

    /// Substitution-aware variant of [`Session::resolve_type`]; always
    /// silent. Hits resolve through the in-flight substitution map, so
    /// `T::value_type` collapses once `T` has an actual argument.
    pub(crate) fn resolve_type_subst(
        &mut self,
        ident: &Identifier,
        current: ScopeId,
        subst: &mut SubstMap,
    ) -> Option<DeclId> {
        let scope = self.ident_scope_subst(ident, current, subst)?;
        let last = ident.last().clone();
        match last.templ() {
            Some(args) => {
                let templ = self.find_template(scope, last.name(), true)?;
                if self.params_fully_specified(args) && self.template_decl_complete(templ) {
                    Some(self.instantiate_decl(templ, args, scope))
                } else {
                    Some(self.intern_tbd(ident.clone()))
                }
            }
            None => self.find_type_subst(scope, last.name(), subst, true),
        }
    }

    /// Resolve an identifier to any symbol.
    pub fn resolve_symbol(&mut self, ident: &Identifier, current: ScopeId) -> Option<DeclId> {
        let scope = self.ident_scope_quiet(ident, current)?;
        self.find_symbol(scope, ident.simple_name(), true)
    }

    /// Resolve an identifier to a template declaration.
    pub fn resolve_template(&mut self, ident: &Identifier, current: ScopeId) -> Option<DeclId> {
        let scope = self.ident_scope_quiet(ident, current)?;
        self.find_template(scope, ident.simple_name(), true)
    }

    /// Whether a template declaration is complete enough to instantiate.
    fn template_decl_complete(&self, templ: DeclId) -> bool {
        match self.decl(templ) {
            Decl::Struct(st) => !st.incomplete,
            _ => true,
        }
    }

    /// Substitute the template-argument lists inside an identifier.
    ///
    /// Returns `None` when nothing actually changes under the map, so callers
    /// can rely on identity to detect a no-op cheaply; `Some` carries a deep
    /// copy with the substituted argument lists.
    pub fn substitute_identifier(
        &mut self,
        ident: &Identifier,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> Option<Identifier> {
        let mut changed = false;
        let mut new_names = Vec::with_capacity(ident.names().len());
        for component in ident.names() {
            match component.templ() {
                Some(templ) => {
                    let args: Vec<DeclId> = templ.iter().collect();
                    let mut new_args = Vec::with_capacity(args.len());
                    let mut component_changed = false;
                    for arg in args {
                        let new_arg = self.substitute_decl(arg, subst, current);
                        if new_arg != arg {
                            component_changed = true;
                        }
                        new_args.push(new_arg);
                    }
                    if component_changed {
                        changed = true;
                        new_names.push(NameComponent::with_templ(
                            component.name(),
                            TemplateParameterList::new(new_args),
                        ));
                    } else {
                        new_names.push(component.clone());
                    }
                }
                None => new_names.push(component.clone()),
            }
        }
        if !changed {
            return None;
        }
        let mut new_ident = Identifier::from_components(new_names, ident.span());
        if let Some(native) = ident.native_scope() {
            new_ident.set_native_scope(native);
        }
        Some(new_ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxdecl_core::{Span, StructKind};

    fn ident(name: &str) -> Identifier {
        Identifier::parse(name, Span::default())
    }

    #[test]
    fn nested_namespace_type_resolves_both_ways() {
        let mut session = Session::new();
        let global = session.global_scope();

        let a = session.new_namespace(ident("A"), global);
        session.add_declaration(global, a);
        let a_scope = session.decl(a).as_namespace().unwrap().scope;

        let b = session.new_namespace(ident("B"), a_scope);
        session.add_declaration(a_scope, b);
        let b_scope = session.decl(b).as_namespace().unwrap().scope;

        let s = session.new_struct_type(StructKind::Struct, ident("S"), b_scope);
        session.add_declaration(b_scope, s);

        // Qualified resolution from the global scope...
        let via_ident = session.resolve_type(&ident("A::B::S"), global);
        // ...matches the scope-by-scope walk.
        let walked_a = session.find_scope(global, "A", true).unwrap();
        let walked_b = session.find_scope(walked_a, "B", true).unwrap();
        let via_walk = session.find_type(walked_b, "S", true);

        assert_eq!(via_ident, Some(s));
        assert_eq!(via_walk, Some(s));
    }

    #[test]
    fn leading_double_colon_restarts_at_global() {
        let mut session = Session::new();
        let global = session.global_scope();

        // ::value at global, and a shadowing N::value.
        let int_ty = session.simple_type("int");
        let global_td = session.new_decl(Decl::Typedef(cxxdecl_core::TypedefType::new(
            ident("value"),
            int_ty,
        )));
        session.add_declaration(global, global_td);

        let n = session.new_namespace(ident("N"), global);
        session.add_declaration(global, n);
        let n_scope = session.decl(n).as_namespace().unwrap().scope;
        let double_ty = session.simple_type("double");
        let inner_td = session.new_decl(Decl::Typedef(cxxdecl_core::TypedefType::new(
            ident("value"),
            double_ty,
        )));
        session.add_declaration(n_scope, inner_td);

        assert_eq!(session.resolve_type(&ident("value"), n_scope), Some(inner_td));
        assert_eq!(session.resolve_type(&ident("::value"), n_scope), Some(global_td));
    }

    #[test]
    fn unknown_qualifier_reports_and_fails() {
        let mut session = Session::new();
        let global = session.global_scope();
        assert_eq!(session.resolve_type(&ident("Missing::x"), global), None);
        assert!(session.diagnostics().has_errors());
    }

    #[test]
    fn native_scope_anchors_resolution() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");

        let n = session.new_namespace(ident("N"), global);
        session.add_declaration(global, n);
        let n_scope = session.decl(n).as_namespace().unwrap().scope;
        let td = session.new_decl(Decl::Typedef(cxxdecl_core::TypedefType::new(
            ident("local"),
            int_ty,
        )));
        session.add_declaration(n_scope, td);

        // Unanchored, resolution from the global scope fails...
        assert_eq!(session.resolve_type(&ident("local"), global), None);
        // ...but an identifier declared inside N resolves from anywhere.
        let mut anchored = ident("local");
        anchored.set_native_scope(n_scope);
        assert_eq!(session.resolve_type(&anchored, global), Some(td));
    }

    #[test]
    fn substitute_identifier_is_identity_when_nothing_changes() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");

        let plain = ident("A::b");
        let mut subst = SubstMap::default();
        subst.insert(int_ty, int_ty);
        assert!(session
            .substitute_identifier(&plain, &mut subst, global)
            .is_none());
    }

    #[test]
    fn substitute_identifier_replaces_template_args() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let double_ty = session.simple_type("double");

        let t = session.new_decl(Decl::TemplateParam(cxxdecl_core::ClassTemplateParam::new(
            ident("T"),
        )));
        let mut reference = Identifier::from_components(
            vec![NameComponent::with_templ(
                "Box",
                TemplateParameterList::new(vec![t]),
            )],
            Span::default(),
        );
        reference.set_native_scope(global);

        let mut subst = SubstMap::default();
        subst.insert(t, int_ty);
        let substituted = session
            .substitute_identifier(&reference, &mut subst, global)
            .expect("argument list changed");
        let args = substituted.last().templ().unwrap();
        assert_eq!(args.parameters(), &[int_ty]);
        assert_eq!(substituted.native_scope(), Some(global));

        // A map that touches nothing in the identifier leaves it alone.
        let mut unrelated = SubstMap::default();
        unrelated.insert(double_ty, int_ty);
        assert!(session
            .substitute_identifier(&reference, &mut unrelated, global)
            .is_none());
    }
}
