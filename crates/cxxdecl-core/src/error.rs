//! Semantic error taxonomy.
//!
//! These are the recoverable conflicts and lookup failures that the scope
//! engine reports through [`Diagnostics`](crate::Diagnostics). None of them
//! abort a parse: lookup misses are plain `None` results at the call sites,
//! conflicts resolve deterministically (the documented earlier/complete
//! declaration wins), and only internal invariant violations (an empty
//! identifier, a dangling arena id) are treated as programmer errors.

use thiserror::Error;

use crate::Span;

/// A recoverable semantic conflict or resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// A name was redeclared with a structurally different type.
    #[error("{name} has a conflicting declaration at {span}")]
    ConflictingDeclaration { name: String, span: Span },

    /// A class/struct/union/enum was redeclared with a different class-key.
    #[error("{declared} {name} was previously declared as {previous} at {span}")]
    ExtensionKindMismatch {
        name: String,
        declared: String,
        previous: String,
        span: Span,
    },

    /// A `using namespace` directive named an unknown namespace.
    #[error("attempt to use undefined namespace {name} at {span}")]
    UndefinedNamespace { name: String, span: Span },

    /// A `using` declaration named an unknown symbol.
    #[error("attempt to use unknown symbol {name} at {span}")]
    UnknownUsingSymbol { name: String, span: Span },

    /// A qualified-name segment did not resolve to a known scope.
    #[error("{name} is not a known scope at {span}")]
    UnknownScope { name: String, span: Span },

    /// A template was referenced with the wrong number of arguments.
    #[error("{name} expects {expected} template arguments, got {got} at {span}")]
    TemplateArgCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    /// Template arguments were applied to something that is not a template.
    #[error("ignoring template parameters for {name}")]
    IgnoredTemplateParameters { name: String },
}

impl SemanticError {
    /// The span this error points at, when one is attached.
    pub fn span(&self) -> Option<Span> {
        match self {
            SemanticError::ConflictingDeclaration { span, .. }
            | SemanticError::ExtensionKindMismatch { span, .. }
            | SemanticError::UndefinedNamespace { span, .. }
            | SemanticError::UnknownUsingSymbol { span, .. }
            | SemanticError::UnknownScope { span, .. }
            | SemanticError::TemplateArgCountMismatch { span, .. } => Some(*span),
            SemanticError::IgnoredTemplateParameters { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = SemanticError::UndefinedNamespace {
            name: "Missing".into(),
            span: Span::new(4, 1, 7),
        };
        assert_eq!(
            err.to_string(),
            "attempt to use undefined namespace Missing at 4:1"
        );
        assert_eq!(err.span(), Some(Span::new(4, 1, 7)));
    }

    #[test]
    fn warning_without_span() {
        let err = SemanticError::IgnoredTemplateParameters {
            name: "Plain".into(),
        };
        assert!(err.span().is_none());
        assert_eq!(err.to_string(), "ignoring template parameters for Plain");
    }
}
