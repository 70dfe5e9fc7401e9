//! Function signature types.

use bitflags::bitflags;

use crate::DeclId;

bitflags! {
    /// Roles a function signature can play within a class.
    ///
    /// Set by the external grammar when it recognizes the declaration form;
    /// the struct analysis reads them to find special members.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FunctionFlags: u16 {
        const CONSTRUCTOR      = 1 << 0;
        const COPY_CONSTRUCTOR = 1 << 1;
        const MOVE_CONSTRUCTOR = 1 << 2;
        const DESTRUCTOR       = 1 << 3;
        const COPY_ASSIGNMENT  = 1 << 4;
        const MOVE_ASSIGNMENT  = 1 << 5;
        const OPERATOR_TYPECAST = 1 << 6;
    }
}

/// The parameter list of a function signature.
///
/// Each parameter is an `Instance` declaration (name + type + optional
/// default), preserving order.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    /// Parameter instances, in order.
    pub parameters: Vec<DeclId>,
    /// Whether the signature ends in `...`.
    pub includes_ellipsis: bool,
}

impl ParameterList {
    /// Create a parameter list.
    pub fn new(parameters: Vec<DeclId>) -> Self {
        Self {
            parameters,
            includes_ellipsis: false,
        }
    }

    /// An empty parameter list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the list is empty (and has no ellipsis).
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && !self.includes_ellipsis
    }
}

/// A function type: return type, parameters, and role flags.
#[derive(Debug, Clone)]
pub struct FunctionType {
    /// The return type.
    pub return_type: DeclId,
    /// The parameter list.
    pub parameters: ParameterList,
    /// Special-member role flags.
    pub flags: FunctionFlags,
    /// Whether this is a `const` member function.
    pub is_const_method: bool,
}

impl FunctionType {
    /// Create a function type.
    pub fn new(return_type: DeclId, parameters: ParameterList) -> Self {
        Self {
            return_type,
            parameters,
            flags: FunctionFlags::empty(),
            is_const_method: false,
        }
    }

    /// Set role flags.
    pub fn with_flags(mut self, flags: FunctionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Mark as a const member function.
    pub fn with_const_method(mut self) -> Self {
        self.is_const_method = true;
        self
    }

    /// Whether this signature is any kind of constructor.
    pub fn is_constructor(&self) -> bool {
        self.flags.intersects(
            FunctionFlags::CONSTRUCTOR
                | FunctionFlags::COPY_CONSTRUCTOR
                | FunctionFlags::MOVE_CONSTRUCTOR,
        )
    }

    /// Whether this signature is a destructor.
    pub fn is_destructor(&self) -> bool {
        self.flags.contains(FunctionFlags::DESTRUCTOR)
    }
}
