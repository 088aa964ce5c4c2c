//! Intermediate Representation (IR)
//!
//! Each method lowers to a linear list of three-address instructions with
//! explicit labels, plus a [`VarTable`] naming every variable the
//! instructions reference. Operands are variable names or immediates; the
//! register allocator later maps names to physical registers.

mod expr;
mod generator;
mod instruction;
mod names;
mod program;
mod types;

pub use generator::IrGenerator;
pub use instruction::{IrInstruction, Operand};
pub use names::NameGen;
pub use program::{
    IrClass, IrMethod, IrVar, VarInfo, VarTable, DEFAULT_SUPERCLASS, INITIALIZER,
    THIS,
};
pub use types::IrType;
