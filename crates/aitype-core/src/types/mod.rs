//! Semantic type model
//!
//! Types are plain structural values. Two types are compatible purely by shape
//! and primitive names; there is no identity.

mod syntax;

pub use syntax::{parse_type, TypeSyntaxError};

use std::fmt;

/// Primitive type names known to the standard scope
pub mod primitives {
    pub const NUM: &str = "num";
    pub const STR: &str = "str";
    pub const BOOL: &str = "bool";
    pub const ARR: &str = "arr";
    pub const OBJ: &str = "obj";
    pub const NULL: &str = "null";
    pub const ANY: &str = "any";

    pub const ALL: [&str; 7] = [NUM, STR, BOOL, ARR, OBJ, NULL, ANY];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Nominal leaf type such as `num` or `any`
    Primitive(String),
    Function(FunctionType),
    Union(Vec<Type>),
    Tuple(Vec<Type>),
}

/// `args` is usually a [`Type::Tuple`] of parameter types, or `any` for
/// "any argument list".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub args: Box<Type>,
    pub return_type: Box<Type>,
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Type::Primitive(name.into())
    }

    pub fn any() -> Self {
        Type::primitive(primitives::ANY)
    }

    pub fn num() -> Self {
        Type::primitive(primitives::NUM)
    }

    pub fn str() -> Self {
        Type::primitive(primitives::STR)
    }

    pub fn bool() -> Self {
        Type::primitive(primitives::BOOL)
    }

    pub fn arr() -> Self {
        Type::primitive(primitives::ARR)
    }

    pub fn obj() -> Self {
        Type::primitive(primitives::OBJ)
    }

    pub fn null() -> Self {
        Type::primitive(primitives::NULL)
    }

    pub fn tuple(children: impl IntoIterator<Item = Type>) -> Self {
        Type::Tuple(children.into_iter().collect())
    }

    pub fn union(children: impl IntoIterator<Item = Type>) -> Self {
        Type::Union(children.into_iter().collect())
    }

    pub fn function(args: Type, return_type: Type) -> Self {
        Type::Function(FunctionType {
            args: Box::new(args),
            return_type: Box::new(return_type),
        })
    }

    /// Function taking exactly `params`
    pub fn signature(params: impl IntoIterator<Item = Type>, return_type: Type) -> Self {
        Type::function(Type::tuple(params), return_type)
    }

    /// Function accepting any argument list
    pub fn variadic(return_type: Type) -> Self {
        Type::function(Type::any(), return_type)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Primitive(name) if name == primitives::ANY)
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(func) => Some(func),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(name) if name.is_empty() => f.write_str("<unknown>"),
            Type::Primitive(name) => f.write_str(name),
            Type::Function(func) => write!(f, "{}", func),
            Type::Union(children) => write_joined(f, children, " | "),
            Type::Tuple(children) => {
                f.write_str("[")?;
                write_joined(f, children, ", ")?;
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@(")?;
        match self.args.as_ref() {
            Type::Tuple(params) => write_joined(f, params, ", ")?,
            _ => f.write_str("...any")?,
        }
        write!(f, "): {}", self.return_type)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], separator: &str) -> fmt::Result {
    for (i, typ) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", typ)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_primitives() {
        assert_eq!(Type::num().to_string(), "num");
        assert_eq!(Type::any().to_string(), "any");
        assert_eq!(Type::primitive("").to_string(), "<unknown>");
    }

    #[test]
    fn test_display_function() {
        let add = Type::signature([Type::num(), Type::num()], Type::num());
        insta::assert_snapshot!(add.to_string(), @"@(num, num): num");

        let log = Type::variadic(Type::null());
        insta::assert_snapshot!(log.to_string(), @"@(...any): null");

        let thunk = Type::signature([], Type::str());
        assert_eq!(thunk.to_string(), "@(): str");
    }

    #[test]
    fn test_display_union_and_tuple() {
        let pair = Type::tuple([Type::num(), Type::union([Type::str(), Type::null()])]);
        insta::assert_snapshot!(pair.to_string(), @"[num, str | null]");
        assert_eq!(Type::tuple([]).to_string(), "[]");
    }

    #[test]
    fn test_non_tuple_args_render_as_rest() {
        let odd = Type::function(Type::union([Type::num(), Type::str()]), Type::bool());
        assert_eq!(odd.to_string(), "@(...any): bool");
    }

    #[test]
    fn test_is_any() {
        assert!(Type::any().is_any());
        assert!(!Type::num().is_any());
        assert!(!Type::union([Type::any()]).is_any());
    }
}
