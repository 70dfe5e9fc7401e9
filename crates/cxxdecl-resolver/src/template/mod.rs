//! Template substitution and instantiation.
//!
//! - [`substitution`]: the substitution map, per-kind deep copies with the
//!   return-self-when-unchanged contract, and recursive-cycle handling via
//!   backpatched proxies
//! - [`instantiation`]: producing concrete scopes/types from templates given
//!   actual argument lists, cached by structural equality of those lists

pub mod instantiation;
pub mod substitution;

pub use substitution::SubstMap;
