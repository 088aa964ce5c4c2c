//! # Program metadata
//!
//! The symbol table of one compilation unit: imports, the class and its
//! superclass, fields, and per-method signatures (return type, parameters,
//! locals). Built once by [`SymbolTableBuilder`] and read-only afterwards.

mod builder;

pub use builder::SymbolTableBuilder;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the static entry method
pub const MAIN_METHOD: &str = "main";

/// Static type: a base name plus array-ness
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    /// Base name (`int`, `boolean`, a class name, ...)
    pub name: String,
    /// One-dimensional array of `name`
    pub is_array: bool,
}

impl Type {
    /// Build a type from its parts
    pub fn new(name: &str, is_array: bool) -> Self {
        Self {
            name: name.to_string(),
            is_array,
        }
    }

    /// `int`
    pub fn int() -> Self {
        Self::new("int", false)
    }

    /// `boolean`
    pub fn boolean() -> Self {
        Self::new("boolean", false)
    }

    /// `void`
    pub fn void() -> Self {
        Self::new("void", false)
    }

    /// `int[]`
    pub fn int_array() -> Self {
        Self::new("int", true)
    }

    /// `String[]`
    pub fn string_array() -> Self {
        Self::new("String", true)
    }

    /// Scalar class type
    pub fn object(class: &str) -> Self {
        Self::new(class, false)
    }

    /// Scalar `int`
    pub fn is_int(&self) -> bool {
        !self.is_array && self.name == "int"
    }

    /// Scalar `boolean`
    pub fn is_boolean(&self) -> bool {
        !self.is_array && self.name == "boolean"
    }

    /// `void`
    pub fn is_void(&self) -> bool {
        !self.is_array && self.name == "void"
    }

    /// `int[]`
    pub fn is_int_array(&self) -> bool {
        self.is_array && self.name == "int"
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A named, typed declaration (field, parameter or local)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Declared name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Written as `int...`
    pub is_varargs: bool,
}

impl Symbol {
    /// Plain symbol
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
            is_varargs: false,
        }
    }
}

/// Declared shape of one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name
    pub name: String,
    /// Declared return type (`void` for the static entry method)
    pub return_type: Type,
    /// Parameters in declaration order
    pub params: Vec<Symbol>,
    /// Locals in declaration order
    pub locals: Vec<Symbol>,
    /// `public`
    pub is_public: bool,
    /// `static`
    pub is_static: bool,
}

impl MethodSignature {
    /// True if the last parameter is variadic
    pub fn has_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_varargs)
    }

    /// Parameter by name
    pub fn param(&self, name: &str) -> Option<&Symbol> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Local by name
    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.locals.iter().find(|l| l.name == name)
    }

    /// The static entry method
    pub fn is_main(&self) -> bool {
        self.is_static && self.name == MAIN_METHOD
    }
}

/// Where a name resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Method parameter
    Param,
    /// Method local
    Local,
    /// Class field
    Field,
}

/// Program metadata for one compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Dotted import names in order, duplicates kept
    pub imports: Vec<String>,
    /// Compiled class
    pub class_name: String,
    /// Superclass, if any
    pub superclass: Option<String>,
    /// Fields in order, duplicates kept
    pub fields: Vec<Symbol>,
    /// Method names in order, duplicates kept
    pub methods: Vec<String>,
    signatures: Vec<MethodSignature>,
}

impl SymbolTable {
    /// Empty table for a class
    pub fn new(class_name: &str, superclass: Option<&str>) -> Self {
        Self {
            imports: Vec::new(),
            class_name: class_name.to_string(),
            superclass: superclass.map(str::to_string),
            fields: Vec::new(),
            methods: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// Register a method. Lookups by name see the first signature of a
    /// duplicated name; [`SymbolTable::declared`] sees every one.
    pub fn add_method(&mut self, signature: MethodSignature) {
        self.methods.push(signature.name.clone());
        self.signatures.push(signature);
    }

    /// Signature of a declared method
    pub fn signature(&self, method: &str) -> Result<&MethodSignature> {
        self.signatures
            .iter()
            .find(|s| s.name == method)
            .ok_or_else(|| Error::UnknownMethod {
                method: method.to_string(),
            })
    }

    /// Signature of the `index`-th method declaration, which must be named
    /// `method`
    pub fn declared(&self, index: usize, method: &str) -> Result<&MethodSignature> {
        self.signatures
            .get(index)
            .filter(|s| s.name == method)
            .ok_or_else(|| Error::UnknownMethod {
                method: method.to_string(),
            })
    }

    /// Declared return type
    pub fn return_type(&self, method: &str) -> Result<&Type> {
        self.signature(method).map(|s| &s.return_type)
    }

    /// Declared parameters
    pub fn parameters(&self, method: &str) -> Result<&[Symbol]> {
        self.signature(method).map(|s| s.params.as_slice())
    }

    /// Declared locals
    pub fn local_variables(&self, method: &str) -> Result<&[Symbol]> {
        self.signature(method).map(|s| s.locals.as_slice())
    }

    /// True if the class declares `method`
    pub fn has_method(&self, method: &str) -> bool {
        self.signatures.iter().any(|s| s.name == method)
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True if `name` is an import, by full dotted name or by last segment
    pub fn is_imported(&self, name: &str) -> bool {
        self.imports
            .iter()
            .any(|i| i == name || i.rsplit('.').next() == Some(name))
    }

    /// True if the superclass exists and is imported
    pub fn superclass_is_imported(&self) -> bool {
        self.superclass
            .as_deref()
            .is_some_and(|s| self.is_imported(s))
    }

    /// Resolve a variable name inside a method: parameter, local, then field
    pub fn resolve(&self, method: &str, name: &str) -> Option<(SymbolKind, &Symbol)> {
        self.resolve_in(self.signature(method).ok()?, name)
    }

    /// Resolve a variable name inside the body declared by `signature`
    pub fn resolve_in<'s>(
        &'s self,
        signature: &'s MethodSignature,
        name: &str,
    ) -> Option<(SymbolKind, &'s Symbol)> {
        if let Some(p) = signature.param(name) {
            return Some((SymbolKind::Param, p));
        }
        if let Some(l) = signature.local(name) {
            return Some((SymbolKind::Local, l));
        }
        self.field(name).map(|f| (SymbolKind::Field, f))
    }
}
