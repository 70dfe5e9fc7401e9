//! Class, struct, and union types.

use std::fmt;

use crate::{DeclId, Identifier, ScopeId, Visibility};

/// The class-key a struct type was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Class,
    Struct,
    Union,
}

impl StructKind {
    /// The C++ keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            StructKind::Class => "class",
            StructKind::Struct => "struct",
            StructKind::Union => "union",
        }
    }

    /// Default base/member visibility for this class-key.
    pub fn default_visibility(self) -> Visibility {
        match self {
            StructKind::Class => Visibility::Private,
            StructKind::Struct | StructKind::Union => Visibility::Public,
        }
    }
}

impl fmt::Display for StructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// One entry of a derivation list: a base class with access and virtualness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseClass {
    /// The base type. Typedefs are unwrapped before this is recorded.
    pub base: DeclId,
    /// Inheritance access level.
    pub vis: Visibility,
    /// Whether this is a virtual base.
    pub is_virtual: bool,
}

/// A class, struct, or union type.
///
/// Owns its member scope (the scope's struct back-pointer points back here).
/// `incomplete` stays true until the closing brace of the body is processed;
/// after that the type is never mutated except to grow the instantiation
/// cache.
#[derive(Debug, Clone)]
pub struct StructType {
    /// Class-key.
    pub kind: StructKind,
    /// Declared name.
    pub ident: Identifier,
    /// The member scope.
    pub scope: ScopeId,
    /// Base classes, in declaration order.
    pub derivation: Vec<BaseClass>,
    /// True until the body's closing brace is processed.
    pub incomplete: bool,
    /// Whether the class was declared `final`.
    pub is_final: bool,
    /// Distinct instantiations produced from this type.
    pub instantiations: Vec<DeclId>,
    /// Re-entrancy marker for `substitute_decl`.
    pub subst_guard: bool,
    /// Proxies handed out while `subst_guard` was set, backpatched once the
    /// substitution completes.
    pub proxies: Vec<DeclId>,
}

impl StructType {
    /// Create a new, incomplete struct type.
    pub fn new(kind: StructKind, ident: Identifier, scope: ScopeId) -> Self {
        Self {
            kind,
            ident,
            scope,
            derivation: Vec::new(),
            incomplete: true,
            is_final: false,
            instantiations: Vec::new(),
            subst_guard: false,
            proxies: Vec::new(),
        }
    }

    /// The unqualified declared name.
    pub fn simple_name(&self) -> &str {
        self.ident.simple_name()
    }

    /// Record an instantiation if not already present.
    pub fn record_instantiation(&mut self, instance: DeclId) {
        if !self.instantiations.contains(&instance) {
            self.instantiations.push(instance);
        }
    }
}
