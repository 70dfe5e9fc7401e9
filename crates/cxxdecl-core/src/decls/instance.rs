//! Variable, function, and enum-value instances.

use bitflags::bitflags;

use crate::{DeclId, Identifier, ScopeId, Visibility};

bitflags! {
    /// Storage-class and definition-state flags on an instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StorageFlags: u16 {
        const STATIC            = 1 << 0;
        const VIRTUAL           = 1 << 1;
        const PURE_VIRTUAL      = 1 << 2;
        /// Overrides a virtual declared in a base class; set by the
        /// virtual-function analysis, not by the parser.
        const INHERITED_VIRTUAL = 1 << 3;
        const DEFAULTED         = 1 << 4;
        const DELETED           = 1 << 5;
        const EXPLICIT          = 1 << 6;
        const INLINE            = 1 << 7;
    }
}

/// A named instance of a type: a variable, a function, or an enum value.
///
/// Whether it is a function is decided by its type (`Decl::Function`), not by
/// a separate variant; the scope groups function instances into overload
/// groups by name.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The declared name, possibly qualified (out-of-line definitions).
    pub ident: Identifier,
    /// The instance's type.
    pub ty: DeclId,
    /// Storage-class flags.
    pub storage: StorageFlags,
    /// Access level, stamped from the owning scope's visibility cursor.
    pub vis: Visibility,
    /// Whether the declaration carried an initializer or default member
    /// value. The initializer expression itself is not modeled.
    pub has_initializer: bool,
    /// Bit-field width, when declared.
    pub bit_width: Option<u32>,
    /// The template-parameter scope, when this is a function template.
    pub template_scope: Option<ScopeId>,
    /// Documentation comment preceding the declaration, passed through
    /// unchanged from the caller.
    pub leading_comment: Option<String>,
}

impl Instance {
    /// Create a plain instance of a type.
    pub fn new(ident: Identifier, ty: DeclId) -> Self {
        Self {
            ident,
            ty,
            storage: StorageFlags::empty(),
            vis: Visibility::Unknown,
            has_initializer: false,
            bit_width: None,
            template_scope: None,
            leading_comment: None,
        }
    }

    /// Set storage flags.
    pub fn with_storage(mut self, storage: StorageFlags) -> Self {
        self.storage = storage;
        self
    }

    /// Mark as carrying an initializer.
    pub fn with_initializer(mut self) -> Self {
        self.has_initializer = true;
        self
    }

    /// Attach a template-parameter scope, making this a function template.
    pub fn with_template_scope(mut self, scope: ScopeId) -> Self {
        self.template_scope = Some(scope);
        self
    }

    /// The unqualified declared name.
    pub fn simple_name(&self) -> &str {
        self.ident.simple_name()
    }

    /// Whether this instance is templated.
    pub fn is_template(&self) -> bool {
        self.template_scope.is_some()
    }
}
