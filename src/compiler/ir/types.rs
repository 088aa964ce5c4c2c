//! IR value types

use crate::symbols::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of an IR variable, operand or field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    /// 32-bit integer
    Int,
    /// Boolean, stored as 0/1
    Boolean,
    /// No value
    Void,
    /// Runtime string (only reaches the IR as `String[]` of the entry method)
    String,
    /// One-dimensional array
    Array(Box<IrType>),
    /// Object reference
    Class(String),
}

impl IrType {
    /// `int[]`
    pub fn int_array() -> Self {
        IrType::Array(Box::new(IrType::Int))
    }

    /// True for `void`
    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }
}

impl From<&Type> for IrType {
    fn from(ty: &Type) -> Self {
        let base = match ty.name.as_str() {
            "int" => IrType::Int,
            "boolean" => IrType::Boolean,
            "void" => IrType::Void,
            "String" => IrType::String,
            other => IrType::Class(other.to_string()),
        };
        if ty.is_array {
            IrType::Array(Box::new(base))
        } else {
            base
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int => f.write_str("int"),
            IrType::Boolean => f.write_str("boolean"),
            IrType::Void => f.write_str("void"),
            IrType::String => f.write_str("String"),
            IrType::Array(elem) => write!(f, "{}[]", elem),
            IrType::Class(name) => f.write_str(name),
        }
    }
}
