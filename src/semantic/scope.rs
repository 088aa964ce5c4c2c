//! Method scope passed explicitly into every visit

use crate::symbols::{MethodSignature, Symbol, SymbolKind, SymbolTable, Type};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Policy for names whose definition lives outside the compilation unit
///
/// Imported classes (and an imported superclass) have no signatures in the
/// symbol table. `AssumeCompatible` treats every use that depends on them as
/// correct because it cannot be verified locally; `Strict` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalTypeAssumption {
    /// Accept what cannot be checked
    #[default]
    AssumeCompatible,
    /// Reject what cannot be checked
    Strict,
}

impl ExternalTypeAssumption {
    /// True when unverifiable uses are accepted
    pub fn assumes_compatible(self) -> bool {
        self == ExternalTypeAssumption::AssumeCompatible
    }
}

/// What a variable name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Parameter, local or field
    Symbol(SymbolKind, &'a Symbol),
    /// Imported class used by name
    Import,
    /// The `this` reference
    This,
}

/// The class-level context plus the method being visited, if any
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Program metadata
    pub table: &'a SymbolTable,
    /// Enclosing method
    pub method: Option<&'a MethodSignature>,
    /// External-type policy
    pub policy: ExternalTypeAssumption,
}

impl<'a> Scope<'a> {
    /// Class-level scope
    pub fn new(table: &'a SymbolTable, policy: ExternalTypeAssumption) -> Self {
        Self {
            table,
            method: None,
            policy,
        }
    }

    /// Scope for the body of the `index`-th method declaration, named
    /// `method`. Duplicated names each get their own signature.
    pub fn enter(self, index: usize, method: &str) -> Result<Self> {
        Ok(Self {
            method: Some(self.table.declared(index, method)?),
            ..self
        })
    }

    /// Inside the static entry method
    pub fn in_static(&self) -> bool {
        self.method.is_some_and(|m| m.is_static)
    }

    /// Type of `this`
    pub fn class_type(&self) -> Type {
        Type::object(&self.table.class_name)
    }

    /// Resolve a name: parameter, local, field, import, then `this`
    pub fn resolve(&self, name: &str) -> Option<Resolution<'a>> {
        if let Some(method) = self.method {
            if let Some((kind, sym)) = self.table.resolve_in(method, name) {
                return Some(Resolution::Symbol(kind, sym));
            }
        } else if let Some(field) = self.table.field(name) {
            return Some(Resolution::Symbol(SymbolKind::Field, field));
        }
        if self.table.is_imported(name) {
            return Some(Resolution::Import);
        }
        if name == "this" {
            return Some(Resolution::This);
        }
        None
    }

    /// Type names usable in declarations of this class
    pub fn is_known_type_name(&self, name: &str) -> bool {
        name == "int"
            || name == "boolean"
            || name == self.table.class_name
            || self.table.superclass.as_deref() == Some(name)
            || self.table.is_imported(name)
    }

    /// True if a value of type `from` may be stored where `to` is declared
    /// (equal types, or the current class into its superclass)
    pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        if from == to {
            return true;
        }
        !from.is_array
            && !to.is_array
            && from.name == self.table.class_name
            && self.table.superclass.as_deref() == Some(to.name.as_str())
    }
}
