//! cxxdecl: scope, symbol-table and template-instantiation core for C++
//! header declaration parsing.
//!
//! This facade re-exports the two layers of the engine:
//!
//! - [`cxxdecl_core`]: the declaration data model: ids, spans, diagnostics,
//!   qualified names, and the closed declaration variant set
//! - [`cxxdecl_resolver`]: the [`Session`] that owns one parsing run and
//!   implements lookup, `using` imports, struct analysis, and template
//!   instantiation
//!
//! The crate is an in-process library: a surrounding grammar feeds it
//! declarations, and a binding generator queries the resulting scope tree.
//! There is no I/O and no persisted state; everything lives for the duration
//! of one [`Session`].
//!
//! ```
//! use cxxdecl::{Identifier, Session, Span, StructKind};
//!
//! let mut session = Session::new();
//! let global = session.global_scope();
//!
//! // namespace game { struct Player; }
//! let ns = session.new_namespace(Identifier::parse("game", Span::default()), global);
//! session.add_declaration(global, ns);
//! let game = session.decl(ns).as_namespace().unwrap().scope;
//! let player = session.new_struct_type(
//!     StructKind::Struct,
//!     Identifier::parse("Player", Span::default()),
//!     game,
//! );
//! session.complete_struct(player);
//! session.add_declaration(game, player);
//!
//! let found = session.resolve_type(&Identifier::parse("game::Player", Span::default()), global);
//! assert_eq!(found, Some(player));
//! ```

pub use cxxdecl_core::{
    BaseClass, ClassTemplateParam, Decl, DeclId, Diagnostic, DiagnosticKind, Diagnostics,
    EnumType, FunctionFlags, FunctionType, Identifier, Instance, NameComponent, NamespaceDecl,
    ParameterList, ScopeId, SemanticError, SimpleType, Span, StorageFlags, StructKind,
    StructType, TbdType, TemplateParameterList, TypeProxy, TypedefType, UsingDirective,
    Visibility,
};
pub use cxxdecl_resolver::{FunctionGroup, Memo, Scope, ScopeKind, Session, SubstMap};
