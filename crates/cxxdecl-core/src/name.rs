//! One segment of a qualified name.

use std::cmp::Ordering;
use std::fmt;

use crate::TemplateParameterList;

/// A single component of a qualified name: `Foo` or `Foo<T, U>`.
///
/// An empty name marks the leading segment of a fully-qualified reference
/// (`::X` parses to an empty component followed by `X`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NameComponent {
    name: String,
    templ: Option<TemplateParameterList>,
}

impl NameComponent {
    /// Create a plain component with no template arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templ: None,
        }
    }

    /// Create a component carrying template arguments.
    pub fn with_templ(name: impl Into<String>, templ: TemplateParameterList) -> Self {
        Self {
            name: name.into(),
            templ: Some(templ),
        }
    }

    /// The bare name, without template arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template-argument list, if this component carries one.
    pub fn templ(&self) -> Option<&TemplateParameterList> {
        self.templ.as_ref()
    }

    /// Whether this component carries template arguments.
    pub fn has_templ(&self) -> bool {
        self.templ.is_some()
    }

    /// Attach or replace the template-argument list.
    pub fn set_templ(&mut self, templ: TemplateParameterList) {
        self.templ = Some(templ);
    }

    /// Whether this is the empty leading component of a `::X` reference.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl PartialOrd for NameComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NameComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.templ.cmp(&other.templ))
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Template arguments are arena handles; rendering them with their
        // declaration names needs a session and lives in the resolver.
        write!(f, "{}", self.name)?;
        if self.templ.is_some() {
            write!(f, "<...>")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeclId;

    #[test]
    fn plain_component() {
        let component = NameComponent::new("Foo");
        assert_eq!(component.name(), "Foo");
        assert!(!component.has_templ());
        assert!(!component.is_empty());
    }

    #[test]
    fn empty_component_marks_global_prefix() {
        let component = NameComponent::new("");
        assert!(component.is_empty());
    }

    #[test]
    fn templated_component() {
        let templ = TemplateParameterList::new(vec![DeclId(1)]);
        let component = NameComponent::with_templ("Foo", templ);
        assert!(component.has_templ());
        assert_eq!(component.templ().unwrap().len(), 1);
    }

    #[test]
    fn ordering_compares_name_then_args() {
        let a = NameComponent::new("A");
        let b = NameComponent::new("B");
        assert!(a < b);

        let plain = NameComponent::new("Foo");
        let templated =
            NameComponent::with_templ("Foo", TemplateParameterList::new(vec![DeclId(0)]));
        assert!(plain < templated);
        assert_ne!(plain, templated);

        let same =
            NameComponent::with_templ("Foo", TemplateParameterList::new(vec![DeclId(0)]));
        assert_eq!(templated, same);
    }
}
