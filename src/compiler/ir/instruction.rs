//! IR instruction definitions

use super::types::IrType;
use crate::ast::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction operand: a named variable or an immediate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Variable from the method's [`VarTable`](super::VarTable)
    Var(String),
    /// Immediate integer; booleans are 0/1
    Const(i32),
}

impl Operand {
    /// Variable operand
    pub fn var(name: &str) -> Self {
        Operand::Var(name.to_string())
    }

    /// Boolean immediate
    pub fn bool(value: bool) -> Self {
        Operand::Const(i32::from(value))
    }

    /// Variable name, if this is a variable
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Operand::Var(name) => Some(name.as_str()),
            Operand::Const(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(name) => f.write_str(name),
            Operand::Const(value) => write!(f, "{}", value),
        }
    }
}

/// IR instruction (three-address code)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrInstruction {
    // Data movement
    /// Copy or literal load: dst = src
    Move {
        /// Destination variable
        dst: String,
        /// Source
        src: Operand,
    },
    /// dst = lhs op rhs
    Binary {
        /// Destination variable
        dst: String,
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Operand,
        /// Right operand
        rhs: Operand,
    },
    /// dst = op src
    Unary {
        /// Destination variable
        dst: String,
        /// Operator
        op: UnaryOp,
        /// Operand
        src: Operand,
    },

    // Objects
    /// dst = object.field
    GetField {
        /// Destination variable
        dst: String,
        /// Object reference
        object: Operand,
        /// Field name
        field: String,
        /// Field type
        ty: IrType,
    },
    /// object.field = value
    PutField {
        /// Object reference
        object: Operand,
        /// Field name
        field: String,
        /// Field type
        ty: IrType,
        /// Stored value
        value: Operand,
    },
    /// dst = new class (uninitialized)
    New {
        /// Destination variable
        dst: String,
        /// Instantiated class
        class: String,
    },

    // Calls
    /// Zero-argument initializer call on a fresh object
    InvokeSpecial {
        /// Object reference
        object: Operand,
        /// Class of the object
        class: String,
        /// Initializer name
        method: String,
    },
    /// dst = class.method(args)
    InvokeStatic {
        /// Result variable, absent for void calls
        dst: Option<String>,
        /// Class (import name)
        class: String,
        /// Method name
        method: String,
        /// Arguments in order
        args: Vec<Operand>,
        /// Return type
        ret: IrType,
    },
    /// dst = object.method(args)
    InvokeVirtual {
        /// Result variable, absent for void calls
        dst: Option<String>,
        /// Receiver
        object: Operand,
        /// Static class of the receiver
        class: String,
        /// Method name
        method: String,
        /// Arguments in order
        args: Vec<Operand>,
        /// Return type
        ret: IrType,
    },

    // Arrays
    /// dst = new int[size]
    NewArray {
        /// Destination variable
        dst: String,
        /// Element count
        size: Operand,
    },
    /// dst = array.length
    ArrayLength {
        /// Destination variable
        dst: String,
        /// Array reference
        array: Operand,
    },
    /// dst = array[index]
    ArrayLoad {
        /// Destination variable
        dst: String,
        /// Array reference
        array: Operand,
        /// Index
        index: Operand,
    },
    /// array[index] = value
    ArrayStore {
        /// Array reference
        array: Operand,
        /// Index
        index: Operand,
        /// Stored value
        value: Operand,
    },

    // Control flow
    /// Return with optional value
    Return(Option<Operand>),
    /// Define a jump target label
    Label(String),
    /// Unconditional jump to label
    Jump(String),
    /// Jump if the condition is non-zero
    JumpIf {
        /// Condition
        cond: Operand,
        /// Target label
        target: String,
    },
}

impl IrInstruction {
    /// Variable written by this instruction
    pub fn def(&self) -> Option<&str> {
        match self {
            IrInstruction::Move { dst, .. }
            | IrInstruction::Binary { dst, .. }
            | IrInstruction::Unary { dst, .. }
            | IrInstruction::GetField { dst, .. }
            | IrInstruction::New { dst, .. }
            | IrInstruction::NewArray { dst, .. }
            | IrInstruction::ArrayLength { dst, .. }
            | IrInstruction::ArrayLoad { dst, .. } => Some(dst.as_str()),
            IrInstruction::InvokeStatic { dst, .. } | IrInstruction::InvokeVirtual { dst, .. } => {
                dst.as_deref()
            }
            _ => None,
        }
    }

    /// Operands read by this instruction
    pub fn uses(&self) -> Vec<&Operand> {
        match self {
            IrInstruction::Move { src, .. } | IrInstruction::Unary { src, .. } => vec![src],
            IrInstruction::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            IrInstruction::GetField { object, .. } | IrInstruction::InvokeSpecial { object, .. } => {
                vec![object]
            }
            IrInstruction::PutField { object, value, .. } => vec![object, value],
            IrInstruction::InvokeStatic { args, .. } => args.iter().collect(),
            IrInstruction::InvokeVirtual { object, args, .. } => {
                std::iter::once(object).chain(args.iter()).collect()
            }
            IrInstruction::NewArray { size, .. } => vec![size],
            IrInstruction::ArrayLength { array, .. } => vec![array],
            IrInstruction::ArrayLoad { array, index, .. } => vec![array, index],
            IrInstruction::ArrayStore {
                array,
                index,
                value,
            } => vec![array, index, value],
            IrInstruction::Return(value) => value.iter().collect(),
            IrInstruction::JumpIf { cond, .. } => vec![cond],
            IrInstruction::New { .. } | IrInstruction::Label(_) | IrInstruction::Jump(_) => {
                Vec::new()
            }
        }
    }

    /// Every variable this instruction references, destination first,
    /// without duplicates
    pub fn referenced_vars(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::new();
        let used = self.uses().into_iter().filter_map(Operand::as_var);
        for name in self.def().into_iter().chain(used) {
            if !vars.contains(&name) {
                vars.push(name);
            }
        }
        vars
    }

    /// True for instructions that end straight-line flow
    pub fn is_terminator(&self) -> bool {
        matches!(self, IrInstruction::Return(_) | IrInstruction::Jump(_))
    }
}
