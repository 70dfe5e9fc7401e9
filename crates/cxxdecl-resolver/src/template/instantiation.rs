//! Template instantiation.
//!
//! Instantiation builds the substitution map from a template's formal
//! parameters to the actual arguments at the use site, deep-copies the
//! template's scope through it, and caches the result on the template keyed
//! by structural equality of the actual argument list; two separately built
//! but equal lists hit the same cache entry.

use cxxdecl_core::{Decl, DeclId, ScopeId, SemanticError, TemplateParameterList};

use crate::session::Session;
use crate::template::SubstMap;

impl Session {
    /// Instantiate a scope with actual template arguments.
    ///
    /// Only meaningful when the scope's parent is a template-parameter scope;
    /// otherwise a warning is reported and the scope returned unchanged. A
    /// fully specified scope is likewise returned unchanged. Results are
    /// cached, identity results included.
    pub fn instantiate_scope(
        &mut self,
        scope: ScopeId,
        actuals: &TemplateParameterList,
        current: ScopeId,
    ) -> ScopeId {
        let parent = self.scope(scope).parent;
        let formals = parent.and_then(|p| self.scope(p).kind.template_params().cloned());
        let Some(formals) = formals else {
            let name = self.scope_local_name(scope, None);
            self.diagnostics_mut()
                .warning(SemanticError::IgnoredTemplateParameters { name });
            return scope;
        };

        if self.scope_fully_specified(scope) {
            return scope;
        }

        for index in 0..self.scope(scope).instantiations.len() {
            if self.param_lists_equal(&self.scope(scope).instantiations[index].0, actuals) {
                return self.scope(scope).instantiations[index].1;
            }
        }

        let simple_name = self.scope_simple_name(scope).to_owned();
        tracing::debug!(
            template = %simple_name,
            args = %self.format_params(actuals),
            site = %current,
            "instantiating scope"
        );

        let mut subst = SubstMap::default();
        self.build_subst_map(
            &formals,
            actuals,
            &simple_name,
            cxxdecl_core::Span::default(),
            &mut subst,
        );

        let result = if subst.is_empty() {
            scope
        } else {
            let mut name = self.scope(scope).name.clone();
            name.set_templ(actuals.clone());
            let parent_scope = parent.expect("template scope parent");
            let replacement = self.new_scope(Some(parent_scope), name);
            self.copy_substitute_scope(scope, replacement, &mut subst);

            // An actual argument may itself be a template parameter (we
            // "instantiated" with another template's formals); make those
            // resolvable inside the new scope.
            let actual_ids: Vec<DeclId> = actuals.iter().collect();
            for actual in actual_ids {
                if let Some(param) = self.decl(actual).as_template_param() {
                    let param_name = param.simple_name().to_owned();
                    self.scope_mut(replacement).types.insert(param_name, actual);
                }
            }
            replacement
        };

        self.scope_mut(scope)
            .instantiations
            .push((actuals.clone(), result));
        result
    }

    /// Instantiate a struct type with actual template arguments.
    ///
    /// Delegates to the owned scope's instantiation. When the produced
    /// scope's struct back-pointer does not point back yet, we are in the
    /// middle of recursively instantiating this very type. The evaluation is
    /// postponed behind a deferred placeholder on the type's fully scoped
    /// name rather than looping.
    pub fn instantiate_struct(
        &mut self,
        decl: DeclId,
        actuals: &TemplateParameterList,
        current: ScopeId,
    ) -> DeclId {
        let scope = match self.decl(decl).as_struct() {
            Some(st) => st.scope,
            None => return decl,
        };
        let new_scope = self.instantiate_scope(scope, actuals, current);

        let back = self.scope(new_scope).struct_type;
        let back_points_here = back
            .and_then(|b| self.decl(b).as_struct())
            .is_some_and(|st| st.scope == new_scope);
        if !back_points_here {
            let name = self.struct_fully_scoped_ident(decl);
            tracing::trace!(
                struct_type = %self.ident_local_name(&name),
                "mid-recursion instantiation postponed"
            );
            return self.intern_tbd(name);
        }

        let result = self.intern_type(back.expect("struct back-pointer"));
        if result != decl {
            if let Some(st) = self.decl_mut(decl).as_struct_mut() {
                st.record_instantiation(result);
            }
        }
        result
    }

    /// Instantiate any template declaration: structs via their scope, alias
    /// templates and function templates by direct substitution. Anything
    /// else warns and passes through.
    pub fn instantiate_decl(
        &mut self,
        decl: DeclId,
        actuals: &TemplateParameterList,
        current: ScopeId,
    ) -> DeclId {
        match self.decl(decl) {
            Decl::Struct(_) => self.instantiate_struct(decl, actuals, current),
            Decl::Typedef(td) if td.template_scope.is_some() => {
                let template_scope = td.template_scope.expect("alias template");
                let target = td.ty;
                let name = td.simple_name().to_owned();
                let span = td.ident.span();
                let Some(formals) =
                    self.scope(template_scope).kind.template_params().cloned()
                else {
                    return decl;
                };
                let mut subst = SubstMap::default();
                self.build_subst_map(&formals, actuals, &name, span, &mut subst);
                self.substitute_decl(target, &mut subst, current)
            }
            Decl::Instance(inst) if inst.template_scope.is_some() => {
                let template_scope = inst.template_scope.expect("function template");
                let name = inst.simple_name().to_owned();
                let span = inst.ident.span();
                let Some(formals) =
                    self.scope(template_scope).kind.template_params().cloned()
                else {
                    return decl;
                };
                let mut subst = SubstMap::default();
                self.build_subst_map(&formals, actuals, &name, span, &mut subst);
                self.substitute_decl(decl, &mut subst, current)
            }
            _ => {
                let name = self.decl_name(decl);
                self.diagnostics_mut()
                    .warning(SemanticError::IgnoredTemplateParameters { name });
                decl
            }
        }
    }
}
