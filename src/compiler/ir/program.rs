//! IR class, method and variable table definitions

use super::instruction::IrInstruction;
use super::types::IrType;
use crate::compiler::graph_coloring::RegisterAssignment;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Superclass of classes that declare none
pub const DEFAULT_SUPERCLASS: &str = "Object";

/// Name of the receiver variable of instance methods
pub const THIS: &str = "this";

/// Method name of the zero-argument object initializer
pub const INITIALIZER: &str = "<init>";

/// A named, typed declaration (field or parameter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrVar {
    /// Name
    pub name: String,
    /// Type
    pub ty: IrType,
}

impl IrVar {
    /// Create a declaration
    pub fn new(name: &str, ty: IrType) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// Variable table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarInfo {
    /// Virtual register, in insertion order
    pub virtual_reg: u32,
    /// Variable type
    pub ty: IrType,
}

/// Ordered map from variable name to [`VarInfo`]
///
/// Holds `this` (instance methods), parameters, locals and temporaries, in
/// that order. Iteration follows insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VarTable {
    entries: Vec<(String, VarInfo)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl VarTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, returning its virtual register. Re-inserting a name
    /// keeps the first entry.
    pub fn insert(&mut self, name: &str, ty: IrType) -> u32 {
        if let Some(info) = self.get(name) {
            return info.virtual_reg;
        }
        let reg = self.entries.len() as u32;
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((
            name.to_string(),
            VarInfo {
                virtual_reg: reg,
                ty,
            },
        ));
        reg
    }

    /// Entry for a name
    pub fn get(&self, name: &str) -> Option<&VarInfo> {
        match self.index.get(name) {
            Some(&i) => self.entries.get(i).map(|(_, info)| info),
            // deserialized tables have no index
            None => self.entries.iter().find(|(n, _)| n == name).map(|(_, info)| info),
        }
    }

    /// True if the name is in the table
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Position of a name in insertion order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.get(name).map(|info| info.virtual_reg as usize)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VarInfo)> {
        self.entries.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for VarTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for VarTable {}

/// One lowered method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrMethod {
    /// Method name
    pub name: String,
    /// `public`
    pub is_public: bool,
    /// `static`
    pub is_static: bool,
    /// Parameters in declaration order
    pub params: Vec<IrVar>,
    /// Return type
    pub return_type: IrType,
    /// Instructions in linear order
    pub instructions: Vec<IrInstruction>,
    /// Every variable the instructions reference
    pub vars: VarTable,
    /// Physical registers, once allocated
    pub registers: Option<RegisterAssignment>,
}

impl IrMethod {
    /// Names of the parameters
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    /// True for parameters and `this`
    pub fn is_pinned(&self, name: &str) -> bool {
        name == THIS || self.params.iter().any(|p| p.name == name)
    }

    /// Register of a variable: the physical one after allocation, the
    /// virtual one otherwise
    pub fn register_of(&self, name: &str) -> Option<u32> {
        match &self.registers {
            Some(assignment) => assignment.registers.get(name).copied(),
            None => self.vars.get(name).map(|info| info.virtual_reg),
        }
    }

    /// Check that every referenced variable has a table entry
    pub fn verify_vars(&self) -> Result<()> {
        for instr in &self.instructions {
            for name in instr.referenced_vars() {
                if !self.vars.contains(name) {
                    return Err(Error::UnresolvedSymbol {
                        name: format!("{} (in method {})", name, self.name),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One lowered class, the unit handed to the bytecode emitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrClass {
    /// Class name
    pub name: String,
    /// Superclass name, [`DEFAULT_SUPERCLASS`] when none was declared
    pub superclass: String,
    /// Imports, dotted
    pub imports: Vec<String>,
    /// Fields in declaration order
    pub fields: Vec<IrVar>,
    /// Methods in declaration order
    pub methods: Vec<IrMethod>,
}

impl IrClass {
    /// Method by name
    pub fn method(&self, name: &str) -> Option<&IrMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Total instruction count
    pub fn instruction_count(&self) -> usize {
        self.methods.iter().map(|m| m.instructions.len()).sum()
    }
}
