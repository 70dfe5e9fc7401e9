//! Scope resolution and template instantiation for C++ declarations.
//!
//! This crate is the engine behind the declaration model in `cxxdecl-core`:
//! a [`Session`] owns the declaration and scope arenas for one header-parsing
//! run and answers name lookups, applies `using` imports, analyzes struct
//! types, and instantiates templates by substitution.
//!
//! ## Architecture
//!
//! The external grammar drives registration: it creates scopes and
//! declarations as it parses and hands them to [`Session::add_declaration`].
//! Identifiers resolve on demand against the scope chain; template
//! instantiation deep-copies a template's scope through a substitution map
//! and caches the result by structural equality of the actual argument list.
//! References that cannot resolve yet collapse later through deferred
//! placeholders.
//!
//! ## Modules
//!
//! - [`session`]: the arenas, interning, and cross-cutting queries
//! - [`scope`]: symbol tables, registration, and the lookup order
//! - [`ident_resolve`]: qualified-identifier resolution
//! - [`declare`]: constructors pairing declarations with owned scopes
//! - [`struct_type`]: derivation, virtual-function and triviality analysis
//! - [`template`]: substitution and instantiation
//! - [`tbd`]: deferred-type resolution

pub mod declare;
pub mod ident_resolve;
pub mod scope;
pub mod session;
pub mod struct_type;
pub mod tbd;
pub mod template;

pub use scope::{FunctionGroup, Memo, Scope, ScopeKind};
pub use session::Session;
pub use template::SubstMap;
