//! Possibly-scoped, possibly-templated name references.

use std::cmp::Ordering;
use std::fmt;

use crate::{NameComponent, ScopeId, Span};

/// A qualified name reference such as `A::B<T>::C`.
///
/// The component list is never empty; the constructors enforce this as a
/// fatal invariant since an empty identifier can only come from a bug in the
/// feeding parser. `native_scope` is a resolved-cache back-reference to the
/// scope the identifier was declared in, used when printing minimal qualified
/// names and as the starting point for re-resolution; it does not participate
/// in equality.
#[derive(Debug, Clone)]
pub struct Identifier {
    names: Vec<NameComponent>,
    native_scope: Option<ScopeId>,
    span: Span,
}

impl Identifier {
    /// Create an identifier from a single component.
    pub fn new(component: NameComponent, span: Span) -> Self {
        Self {
            names: vec![component],
            native_scope: None,
            span,
        }
    }

    /// Create an identifier from components in order.
    ///
    /// Panics if `names` is empty.
    pub fn from_components(names: Vec<NameComponent>, span: Span) -> Self {
        assert!(!names.is_empty(), "identifier must have at least one component");
        Self {
            names,
            native_scope: None,
            span,
        }
    }

    /// Parse a `::`-separated name into components, none templated.
    ///
    /// A leading `::` produces the empty first component that restarts
    /// resolution at the global scope.
    pub fn parse(text: &str, span: Span) -> Self {
        let names: Vec<NameComponent> = text.split("::").map(NameComponent::new).collect();
        Self::from_components(names, span)
    }

    /// The components, in order.
    pub fn names(&self) -> &[NameComponent] {
        &self.names
    }

    /// Mutable access to the components, for substitution.
    pub fn names_mut(&mut self) -> &mut Vec<NameComponent> {
        &mut self.names
    }

    /// The last component.
    pub fn last(&self) -> &NameComponent {
        self.names.last().expect("identifier is never empty")
    }

    /// The unqualified name: the last component's bare name.
    pub fn simple_name(&self) -> &str {
        self.last().name()
    }

    /// Whether the reference carries any scoping (`A::b` rather than `b`).
    pub fn is_scoped(&self) -> bool {
        self.names.len() > 1
    }

    /// Whether the reference is anchored at the global scope (`::x`).
    pub fn is_global(&self) -> bool {
        self.names[0].is_empty()
    }

    /// Append a component.
    pub fn push(&mut self, component: NameComponent) {
        self.names.push(component);
    }

    /// The scope this identifier was declared in, once recorded.
    pub fn native_scope(&self) -> Option<ScopeId> {
        self.native_scope
    }

    /// Record the scope this identifier was declared in.
    pub fn set_native_scope(&mut self, scope: ScopeId) {
        self.native_scope = Some(scope);
    }

    /// Source position of the reference.
    pub fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for Identifier {}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.names.cmp(&other.names)
    }
}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.names.hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.names {
            if !first {
                write!(f, "::")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }
        Ok(())
    }
}
