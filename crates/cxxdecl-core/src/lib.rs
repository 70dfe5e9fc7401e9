//! Core data model for C++ declaration parsing.
//!
//! This crate defines the leaf types of the scope/symbol-table engine:
//! arena ids, source spans, diagnostics, qualified names, and the closed
//! declaration variant set. All behavior (lookup, substitution, template
//! instantiation) lives in `cxxdecl-resolver`, which owns the arenas these
//! ids point into.
//!
//! ## Modules
//!
//! - [`ids`]: `DeclId` / `ScopeId` arena handles
//! - [`span`]: source positions
//! - [`visibility`]: member access levels
//! - [`error`]: the recoverable semantic-error taxonomy
//! - [`diagnostics`]: the accumulating error-sink capability
//! - [`name`]: one qualified-name segment
//! - [`ident`]: possibly-scoped, possibly-templated references
//! - [`template_list`]: ordered template parameter/argument lists
//! - [`decls`]: the declaration variants

pub mod decls;
pub mod diagnostics;
pub mod error;
pub mod ident;
pub mod ids;
pub mod name;
pub mod span;
pub mod template_list;
pub mod visibility;

pub use decls::{
    BaseClass, ClassTemplateParam, Decl, EnumType, FunctionFlags, FunctionType, Instance,
    NamespaceDecl, ParameterList, SimpleType, StorageFlags, StructKind, StructType, TbdType,
    TypeProxy, TypedefType, UsingDirective,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::SemanticError;
pub use ident::Identifier;
pub use ids::{DeclId, ScopeId};
pub use name::NameComponent;
pub use span::Span;
pub use template_list::TemplateParameterList;
pub use visibility::Visibility;
