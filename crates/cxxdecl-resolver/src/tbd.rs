//! Deferred-type resolution.
//!
//! A `Tbd` declaration stands in for an identifier that could not resolve at
//! the point it was seen, usually because it depends on an unsubstituted
//! template parameter. Resolution is re-attempted lazily; substitution
//! collapses the placeholder to the real type the moment enough context
//! exists.

use cxxdecl_core::{Decl, DeclId, ScopeId};

use crate::session::Session;
use crate::template::SubstMap;

impl Session {
    /// Re-attempt resolution of a deferred placeholder.
    ///
    /// Returns the resolved type on success, or the placeholder itself
    /// unchanged when the reference still cannot be resolved. A re-entrancy
    /// guard keeps self-referential placeholders from recursing.
    pub fn resolve_tbd(&mut self, tbd: DeclId, current: ScopeId) -> DeclId {
        let ident = match self.decl(tbd).as_tbd() {
            Some(t) if !t.resolve_guard => t.ident.clone(),
            _ => return tbd,
        };
        self.decl_mut(tbd).as_tbd_mut().expect("tbd").resolve_guard = true;

        let resolved = self.resolve_type_quiet(&ident, current);

        self.decl_mut(tbd).as_tbd_mut().expect("tbd").resolve_guard = false;
        match resolved {
            Some(found) if found != tbd => found,
            _ => tbd,
        }
    }

    /// Substitute a deferred placeholder.
    ///
    /// Re-runs the identifier's substitution and, when the reference is now
    /// resolvable to a real type through the in-flight map, returns that type
    /// instead of a placeholder. Otherwise the result is a placeholder for
    /// the substituted identifier, or the original when nothing changed.
    pub(crate) fn substitute_tbd(
        &mut self,
        tbd: DeclId,
        subst: &mut SubstMap,
        current: ScopeId,
    ) -> DeclId {
        let ident = match self.decl(tbd).as_tbd() {
            Some(t) => t.ident.clone(),
            None => return tbd,
        };
        let substituted = self.substitute_identifier(&ident, subst, current);
        let changed = substituted.is_some();
        let new_ident = substituted.unwrap_or_else(|| ident.clone());

        if let Some(resolved) = self.resolve_type_subst(&new_ident, current, subst) {
            if !matches!(self.decl(self.deref_proxy(resolved)), Decl::Tbd(_)) {
                tracing::trace!(
                    reference = %self.ident_local_name(&new_ident),
                    "deferred type collapsed"
                );
                return resolved;
            }
        }

        if changed {
            self.intern_tbd(new_ident)
        } else {
            tbd
        }
    }
}
