//! Declaration substitution.
//!
//! A substitution map pairs formal template parameters with actual arguments
//! and, as a pass proceeds, accumulates every original-to-replacement pair it
//! produced, which is what lets a self-referential class template find its
//! own replacement instead of recursing forever.
//!
//! Every `substitute_*` entry point honors the identity contract: when
//! nothing actually changes under the map, the original id (or `None` for
//! identifiers) is returned, so callers detect no-ops by comparison alone.

use cxxdecl_core::{
    BaseClass, Decl, DeclId, FunctionType, Identifier, Instance, NameComponent, ParameterList,
    ScopeId, SemanticError, Span, StructType, TemplateParameterList, TypeProxy, TypedefType,
};
use rustc_hash::FxHashMap;

use crate::session::Session;

/// Formal parameter (or already-substituted original) to replacement.
pub type SubstMap = FxHashMap<DeclId, DeclId>;

impl Session {
    /// Pair formal parameters with actual arguments, positionally.
    ///
    /// Trailing formals without an actual fall back to their declared
    /// default; an arity mismatch is reported and pairing truncates. Pairs
    /// whose actual is structurally identical to the formal are skipped, so
    /// instantiating a template with its own parameters produces an empty
    /// map.
    pub fn build_subst_map(
        &mut self,
        formals: &TemplateParameterList,
        actuals: &TemplateParameterList,
        name: &str,
        span: Span,
        subst: &mut SubstMap,
    ) {
        if actuals.len() > formals.len() {
            self.diagnostics_mut()
                .error(SemanticError::TemplateArgCountMismatch {
                    name: name.to_owned(),
                    expected: formals.len(),
                    got: actuals.len(),
                    span,
                });
        }
        let actual_ids: Vec<DeclId> = actuals.iter().collect();
        for (index, formal) in formals.iter().enumerate() {
            let actual = match actual_ids.get(index) {
                Some(&actual) => Some(actual),
                None => self
                    .decl(formal)
                    .as_template_param()
                    .and_then(|param| param.default),
            };
            let Some(actual) = actual else {
                self.diagnostics_mut()
                    .error(SemanticError::TemplateArgCountMismatch {
                        name: name.to_owned(),
                        expected: formals.len(),
                        got: actuals.len(),
                        span,
                    });
                break;
            };
            if !self.decl_structural_eq(formal, actual) {
                subst.insert(formal, actual);
            }
        }
    }

    /// Substitute a declaration through the map.
    pub fn substitute_decl(
        &mut self,
        decl: DeclId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> DeclId {
        if let Some(&replacement) = subst.get(&decl) {
            return replacement;
        }
        match self.decl(decl) {
            Decl::Simple(_)
            | Decl::Namespace(_)
            | Decl::Using(_)
            | Decl::Enum(_)
            | Decl::TemplateParam(_) => decl,
            Decl::Proxy(proxy) => match proxy.actual {
                Some(actual) if actual != decl => actual,
                _ => decl,
            },
            Decl::Typedef(_) => self.substitute_typedef(decl, subst, current),
            Decl::Function(_) => self.substitute_function(decl, subst, current),
            Decl::Instance(_) => self.substitute_instance(decl, subst, current),
            Decl::Tbd(_) => self.substitute_tbd(decl, subst, current),
            Decl::Struct(_) => self.substitute_struct(decl, subst, current),
        }
    }

    fn substitute_typedef(
        &mut self,
        decl: DeclId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> DeclId {
        let (ident, ty, template_scope) = {
            let td = self.decl(decl).as_typedef().expect("typedef");
            (td.ident.clone(), td.ty, td.template_scope)
        };
        let new_ty = self.substitute_decl(ty, subst, current);
        let new_ident = self.substitute_identifier(&ident, subst, current);
        if new_ty == ty && new_ident.is_none() {
            return decl;
        }
        let mut replacement = TypedefType::new(new_ident.unwrap_or(ident), new_ty);
        replacement.template_scope = template_scope;
        self.new_decl(Decl::Typedef(replacement))
    }

    fn substitute_function(
        &mut self,
        decl: DeclId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> DeclId {
        let (return_type, parameters, includes_ellipsis, flags, is_const_method) = {
            let func = self.decl(decl).as_function().expect("function");
            (
                func.return_type,
                func.parameters.parameters.clone(),
                func.parameters.includes_ellipsis,
                func.flags,
                func.is_const_method,
            )
        };
        let new_return = self.substitute_decl(return_type, subst, current);
        let mut changed = new_return != return_type;
        let mut new_parameters = Vec::with_capacity(parameters.len());
        for param in parameters {
            let new_param = self.substitute_decl(param, subst, current);
            if new_param != param {
                changed = true;
            }
            new_parameters.push(new_param);
        }
        if !changed {
            return decl;
        }
        let mut parameter_list = ParameterList::new(new_parameters);
        parameter_list.includes_ellipsis = includes_ellipsis;
        let mut replacement = FunctionType::new(new_return, parameter_list);
        replacement.flags = flags;
        replacement.is_const_method = is_const_method;
        self.new_decl(Decl::Function(replacement))
    }

    fn substitute_instance(
        &mut self,
        decl: DeclId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> DeclId {
        let original = match self.decl(decl) {
            Decl::Instance(inst) => inst.clone(),
            _ => return decl,
        };
        let new_ty = self.substitute_decl(original.ty, subst, current);
        let new_ident = self.substitute_identifier(&original.ident, subst, current);
        if new_ty == original.ty && new_ident.is_none() {
            return decl;
        }
        let mut replacement = Instance::new(new_ident.unwrap_or(original.ident), new_ty);
        replacement.storage = original.storage;
        replacement.vis = original.vis;
        replacement.has_initializer = original.has_initializer;
        replacement.bit_width = original.bit_width;
        replacement.template_scope = original.template_scope;
        replacement.leading_comment = original.leading_comment;
        self.new_decl(Decl::Instance(replacement))
    }

    /// Substitute a struct type.
    ///
    /// An incomplete type cannot be meaningfully substituted yet and returns
    /// itself. A type discovered to be substituting itself hands out a proxy
    /// cell, recorded for backpatching once this substitution completes.
    pub(crate) fn substitute_struct(
        &mut self,
        decl: DeclId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> DeclId {
        let (incomplete, guarded) = {
            let st = self.decl(decl).as_struct().expect("struct");
            (st.incomplete, st.subst_guard)
        };
        if incomplete {
            return decl;
        }
        if guarded {
            let proxy = self.new_decl(Decl::Proxy(TypeProxy::unfilled()));
            self.decl_mut(decl)
                .as_struct_mut()
                .expect("struct")
                .proxies
                .push(proxy);
            tracing::trace!(
                struct_type = %self.decl_name(decl),
                "recursive substitution, handing out proxy"
            );
            return proxy;
        }

        let (kind, ident, scope, derivation, is_final) = {
            let st = self.decl(decl).as_struct().expect("struct");
            (
                st.kind,
                st.ident.clone(),
                st.scope,
                st.derivation.clone(),
                st.is_final,
            )
        };
        self.decl_mut(decl).as_struct_mut().expect("struct").subst_guard = true;

        let new_scope = self.substitute_scope(scope, subst, current);
        let new_ident = self.substitute_identifier(&ident, subst, current);
        let mut unchanged = new_scope == scope && new_ident.is_none();
        let mut rep_ident = new_ident.unwrap_or_else(|| ident.clone());

        let mut new_derivation = Vec::with_capacity(derivation.len());
        for base in derivation {
            let new_base = self.substitute_decl(base.base, subst, current);
            if new_base != base.base {
                unchanged = false;
            }
            new_derivation.push(BaseClass {
                base: new_base,
                ..base
            });
        }

        let raw = if unchanged {
            decl
        } else {
            // If the substituted scope hangs under a name that now carries
            // template arguments, write those arguments into the identifier
            // as well.
            if new_scope != scope {
                if let Some(parent) = self.scope(new_scope).parent {
                    let parent_name = self.scope(parent).name.clone();
                    if parent_name.has_templ() && !rep_ident.last().has_templ() {
                        let mut component = NameComponent::new(rep_ident.simple_name());
                        component.set_templ(parent_name.templ().expect("templated").clone());
                        rep_ident = Identifier::new(component, ident.span());
                    }
                }
            }
            let mut replacement = StructType::new(kind, rep_ident, new_scope);
            replacement.incomplete = false;
            replacement.is_final = is_final;
            replacement.derivation = new_derivation;
            let replacement_id = self.new_decl(Decl::Struct(replacement));
            if new_scope != scope {
                self.scope_mut(new_scope).struct_type = Some(replacement_id);
            }
            replacement_id
        };

        let result = self.intern_type(raw);
        subst.insert(decl, result);

        let proxies = {
            let st = self.decl_mut(decl).as_struct_mut().expect("struct");
            st.subst_guard = false;
            std::mem::take(&mut st.proxies)
        };
        for proxy in proxies {
            if let Some(cell) = self.decl_mut(proxy).as_proxy_mut() {
                cell.fill(result);
            }
        }
        if result != decl {
            self.decl_mut(decl)
                .as_struct_mut()
                .expect("struct")
                .record_instantiation(result);
        }
        result
    }

    /// Substitute a scope, deep-copying every contained declaration.
    ///
    /// Returns the original scope when it is already fully specified, when
    /// it is re-entrantly substituting itself, or when nothing changed and
    /// the parent reference stayed the same.
    pub(crate) fn substitute_scope(
        &mut self,
        scope: ScopeId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> ScopeId {
        if self.scope_fully_specified(scope) {
            return scope;
        }
        if self.scope(scope).subst_guard {
            return scope;
        }
        self.scope_mut(scope).subst_guard = true;

        let name = self.scope(scope).name.clone();
        let parent = self.scope(scope).parent;
        let replacement = self.new_scope(Some(current), name);

        // A scope with its own template parameters keeps them formal: they
        // are substituted at its own instantiation time, not here.
        let formals: Vec<DeclId> = parent
            .and_then(|p| self.scope(p).kind.template_params().cloned())
            .map(|params| params.iter().collect())
            .unwrap_or_default();
        let changed = if formals.is_empty() {
            self.copy_substitute_scope(scope, replacement, subst)
        } else {
            let mut narrowed = subst.clone();
            for formal in formals {
                narrowed.remove(&formal);
            }
            self.copy_substitute_scope(scope, replacement, &mut narrowed)
        };

        self.scope_mut(scope).subst_guard = false;
        if !changed && Some(current) == parent {
            scope
        } else {
            replacement
        }
    }

    /// Copy every declaration of `from` into the already-created `to`,
    /// filtering each through the map. Returns whether anything changed.
    pub(crate) fn copy_substitute_scope(
        &mut self,
        from: ScopeId,
        to: ScopeId,
        subst: &mut SubstMap,
    ) -> bool {
        let mut changed = false;

        if let Some(struct_type) = self.scope(from).struct_type {
            let (kind, derivation, native, span) = {
                let st = self.decl(struct_type).as_struct().expect("struct");
                (
                    st.kind,
                    st.derivation.clone(),
                    st.ident.native_scope(),
                    st.ident.span(),
                )
            };
            let to_name = self.scope(to).name.clone();
            let mut new_ident = Identifier::new(to_name, span);
            if let Some(native_scope) = native {
                new_ident.set_native_scope(native_scope);
            }
            let mut new_struct = StructType::new(kind, new_ident, to);
            new_struct.incomplete = false;
            for base in derivation {
                let new_base = self.substitute_decl(base.base, subst, to);
                if new_base != base.base {
                    changed = true;
                }
                new_struct.derivation.push(BaseClass {
                    base: new_base,
                    ..base
                });
            }
            let new_struct_id = self.new_decl(Decl::Struct(new_struct));
            self.scope_mut(to).struct_type = Some(new_struct_id);
        }

        let declarations = self.scope(from).declarations.clone();
        for decl in declarations {
            let new_decl = self.substitute_decl(decl, subst, to);
            self.scope_mut(to).declarations.push(new_decl);
            if new_decl != decl {
                changed = true;
            }
        }

        let functions: Vec<(String, Vec<DeclId>)> = self
            .scope(from)
            .functions
            .iter()
            .map(|(name, group)| (name.clone(), group.instances.clone()))
            .collect();
        for (name, instances) in functions {
            for instance in instances {
                let new_instance = self.substitute_decl(instance, subst, to);
                if new_instance != instance {
                    changed = true;
                }
                let group = self
                    .scope_mut(to)
                    .functions
                    .entry(name.clone())
                    .or_insert_with(|| crate::scope::FunctionGroup {
                        name: name.clone(),
                        instances: Vec::new(),
                    });
                group.instances.push(new_instance);
            }
        }

        let types: Vec<(String, DeclId)> = self
            .scope(from)
            .types
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        for (name, id) in types {
            let new_id = self.substitute_decl(id, subst, to);
            if new_id != id {
                changed = true;
            }
            self.scope_mut(to).types.insert(name, new_id);
        }

        let variables: Vec<(String, DeclId)> = self
            .scope(from)
            .variables
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        for (name, id) in variables {
            let new_id = self.substitute_decl(id, subst, to);
            if new_id != id {
                changed = true;
            }
            self.scope_mut(to).variables.insert(name, new_id);
        }

        let enum_values: Vec<(String, DeclId)> = self
            .scope(from)
            .enum_values
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        for (name, id) in enum_values {
            let new_id = self.substitute_decl(id, subst, to);
            if new_id != id {
                changed = true;
            }
            self.scope_mut(to).enum_values.insert(name, new_id);
        }

        let templates: Vec<(String, DeclId)> = self
            .scope(from)
            .templates
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        for (name, id) in templates {
            let new_id = self.substitute_decl(id, subst, to);
            if new_id != id {
                changed = true;
            }
            self.scope_mut(to).templates.insert(name, new_id);
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxdecl_core::{ClassTemplateParam, StructKind};

    fn ident(name: &str) -> Identifier {
        Identifier::parse(name, Span::default())
    }

    fn template_param(session: &mut Session, name: &str) -> DeclId {
        session.new_decl(Decl::TemplateParam(ClassTemplateParam::new(ident(name))))
    }

    #[test]
    fn map_hit_returns_replacement() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");

        let mut subst = SubstMap::default();
        subst.insert(t, int_ty);
        assert_eq!(session.substitute_decl(t, &mut subst, global), int_ty);
    }

    #[test]
    fn non_dependent_decls_pass_through() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");

        let mut subst = SubstMap::default();
        subst.insert(t, int_ty);
        let double_ty = session.simple_type("double");
        assert_eq!(
            session.substitute_decl(double_ty, &mut subst, global),
            double_ty
        );
    }

    #[test]
    fn unchanged_instance_returns_same_id() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");

        let member = session.new_decl(Decl::Instance(Instance::new(ident("x"), int_ty)));
        let mut subst = SubstMap::default();
        subst.insert(t, session.simple_type("double"));
        assert_eq!(session.substitute_decl(member, &mut subst, global), member);
    }

    #[test]
    fn dependent_instance_is_copied() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");

        let member = session.new_decl(Decl::Instance(Instance::new(ident("value"), t)));
        let mut subst = SubstMap::default();
        subst.insert(t, int_ty);
        let new_member = session.substitute_decl(member, &mut subst, global);
        assert_ne!(new_member, member);
        let inst = session.decl(new_member).as_instance().unwrap();
        assert_eq!(inst.ty, int_ty);
        assert_eq!(inst.simple_name(), "value");
    }

    #[test]
    fn function_signature_substitutes_params_and_return() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");

        let param = session.new_decl(Decl::Instance(Instance::new(ident("value"), t)));
        let func = session.new_decl(Decl::Function(FunctionType::new(
            t,
            ParameterList::new(vec![param]),
        )));

        let mut subst = SubstMap::default();
        subst.insert(t, int_ty);
        let new_func = session.substitute_decl(func, &mut subst, global);
        assert_ne!(new_func, func);
        let signature = session.decl(new_func).as_function().unwrap();
        assert_eq!(signature.return_type, int_ty);
        let new_param = signature.parameters.parameters[0];
        assert_eq!(session.decl(new_param).as_instance().unwrap().ty, int_ty);
    }

    #[test]
    fn incomplete_struct_substitution_is_noop() {
        let mut session = Session::new();
        let global = session.global_scope();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");

        let st = session.new_struct_type(StructKind::Struct, ident("Fwd"), global);
        let mut subst = SubstMap::default();
        subst.insert(t, int_ty);
        assert_eq!(session.substitute_decl(st, &mut subst, global), st);
    }

    #[test]
    fn build_map_skips_identity_pairs() {
        let mut session = Session::new();
        let t = template_param(&mut session, "T");
        let formals = TemplateParameterList::new(vec![t]);
        let actuals = TemplateParameterList::new(vec![t]);

        let mut subst = SubstMap::default();
        session.build_subst_map(&formals, &actuals, "Box", Span::default(), &mut subst);
        assert!(subst.is_empty());
    }

    #[test]
    fn build_map_uses_defaults_for_missing_actuals() {
        let mut session = Session::new();
        let int_ty = session.simple_type("int");
        let t = session.new_decl(Decl::TemplateParam(
            ClassTemplateParam::new(ident("T")).with_default(int_ty),
        ));
        let formals = TemplateParameterList::new(vec![t]);
        let actuals = TemplateParameterList::default();

        let mut subst = SubstMap::default();
        session.build_subst_map(&formals, &actuals, "Box", Span::default(), &mut subst);
        assert_eq!(subst.get(&t), Some(&int_ty));
        assert!(!session.diagnostics().has_errors());
    }

    #[test]
    fn build_map_reports_arity_mismatch() {
        let mut session = Session::new();
        let int_ty = session.simple_type("int");
        let t = template_param(&mut session, "T");
        let formals = TemplateParameterList::new(vec![t]);
        let actuals = TemplateParameterList::new(vec![int_ty, int_ty]);

        let mut subst = SubstMap::default();
        session.build_subst_map(&formals, &actuals, "Box", Span::default(), &mut subst);
        assert!(session.diagnostics().has_errors());
    }
}
