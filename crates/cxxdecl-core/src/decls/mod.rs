//! The declaration model.
//!
//! Every declaration the external grammar produces is stored in the session's
//! arena as one of these variants. The enum is closed and matched
//! exhaustively; the `as_*` accessors replace the dynamic-cast dispatch of a
//! class hierarchy.

mod enum_type;
mod function;
mod instance;
mod namespace;
mod proxy;
mod simple;
mod struct_type;
mod tbd;
mod template_param;
mod typedef;
mod using;

pub use enum_type::EnumType;
pub use function::{FunctionFlags, FunctionType, ParameterList};
pub use instance::{Instance, StorageFlags};
pub use namespace::NamespaceDecl;
pub use proxy::TypeProxy;
pub use simple::SimpleType;
pub use struct_type::{BaseClass, StructKind, StructType};
pub use tbd::TbdType;
pub use template_param::ClassTemplateParam;
pub use typedef::TypedefType;
pub use using::UsingDirective;

/// A declaration node.
#[derive(Debug, Clone)]
pub enum Decl {
    /// A builtin type: `int`, `double`, `void`, ...
    Simple(SimpleType),
    /// A class, struct, or union.
    Struct(StructType),
    /// An enumeration.
    Enum(EnumType),
    /// A typedef or alias (alias templates carry a template scope).
    Typedef(TypedefType),
    /// A deferred placeholder for an identifier that cannot resolve yet.
    Tbd(TbdType),
    /// A once-writable cell backpatched after recursive substitution.
    Proxy(TypeProxy),
    /// A function signature type.
    Function(FunctionType),
    /// A variable, function, or enum-value instance.
    Instance(Instance),
    /// A namespace.
    Namespace(NamespaceDecl),
    /// A formal template type parameter (`class T`).
    TemplateParam(ClassTemplateParam),
    /// A `using` directive or declaration.
    Using(UsingDirective),
}

impl Decl {
    /// Whether this declaration denotes a type.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Decl::Simple(_)
                | Decl::Struct(_)
                | Decl::Enum(_)
                | Decl::Typedef(_)
                | Decl::Tbd(_)
                | Decl::Proxy(_)
                | Decl::Function(_)
                | Decl::TemplateParam(_)
        )
    }

    /// Whether this is a class/struct/union/enum, i.e. an extension type
    /// needing registration distinct from its full definition.
    pub fn is_extension_type(&self) -> bool {
        matches!(self, Decl::Struct(_) | Decl::Enum(_))
    }

    /// A short keyword naming the declaration kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Simple(_) => "type",
            Decl::Struct(s) => s.kind.keyword(),
            Decl::Enum(_) => "enum",
            Decl::Typedef(_) => "typedef",
            Decl::Tbd(_) => "type",
            Decl::Proxy(_) => "type",
            Decl::Function(_) => "function",
            Decl::Instance(_) => "instance",
            Decl::Namespace(_) => "namespace",
            Decl::TemplateParam(_) => "template parameter",
            Decl::Using(_) => "using",
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleType> {
        match self {
            Decl::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Decl::Struct(struct_type) => Some(struct_type),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructType> {
        match self {
            Decl::Struct(struct_type) => Some(struct_type),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Decl::Enum(enum_type) => Some(enum_type),
            _ => None,
        }
    }

    pub fn as_typedef(&self) -> Option<&TypedefType> {
        match self {
            Decl::Typedef(typedef) => Some(typedef),
            _ => None,
        }
    }

    pub fn as_tbd(&self) -> Option<&TbdType> {
        match self {
            Decl::Tbd(tbd) => Some(tbd),
            _ => None,
        }
    }

    pub fn as_tbd_mut(&mut self) -> Option<&mut TbdType> {
        match self {
            Decl::Tbd(tbd) => Some(tbd),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&TypeProxy> {
        match self {
            Decl::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn as_proxy_mut(&mut self) -> Option<&mut TypeProxy> {
        match self {
            Decl::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Decl::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Decl::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_instance_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Decl::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&NamespaceDecl> {
        match self {
            Decl::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn as_template_param(&self) -> Option<&ClassTemplateParam> {
        match self {
            Decl::TemplateParam(param) => Some(param),
            _ => None,
        }
    }

    pub fn as_using(&self) -> Option<&UsingDirective> {
        match self {
            Decl::Using(using) => Some(using),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        let decl = Decl::Simple(SimpleType::new("int"));
        assert!(decl.is_type());
        assert!(decl.as_simple().is_some());
        assert!(decl.as_struct().is_none());
        assert!(decl.as_instance().is_none());
        assert!(!decl.is_extension_type());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Decl::Simple(SimpleType::new("int")).kind_name(), "type");
        assert_eq!(
            Decl::Proxy(TypeProxy::unfilled()).kind_name(),
            "type"
        );
    }
}
