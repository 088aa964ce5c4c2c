//! Node kinds and operators of the syntax tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of a node. `-1/-1` means the position is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line, or -1
    pub line: i32,
    /// 1-based column, or -1
    pub column: i32,
}

impl Position {
    /// Position with no source information (table-level checks)
    pub const UNKNOWN: Position = Position {
        line: -1,
        column: -1,
    };

    /// Create a position from a line and column
    pub fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::UNKNOWN
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Source symbol of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// `+ - * /`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    /// `< > <= >=`
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }

    /// `== !=`
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    /// `&& ||`
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

impl UnaryOp {
    /// Source symbol of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Node kinds
///
/// The children of each kind have a fixed layout, listed per variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // Declarations
    /// Compilation unit. Children: `ImportDecl*`, `ClassDecl`
    Program,
    /// `import a.b.C;` Children: none
    ImportDecl {
        /// Dotted path segments
        path: Vec<String>,
    },
    /// Class declaration. Children: `VarDecl*` (fields), `MethodDecl*`
    ClassDecl {
        /// Class name
        name: String,
        /// Superclass name, if any
        superclass: Option<String>,
    },
    /// Field or local declaration. Children: `TypeRef`
    VarDecl {
        /// Declared name
        name: String,
    },
    /// Method declaration.
    /// Children: `TypeRef?` (return type), `Param*`, `VarDecl*`, statements
    MethodDecl {
        /// Method name
        name: String,
        /// Declared `public`
        is_public: bool,
        /// Declared `static`
        is_static: bool,
    },
    /// Method parameter. Children: `TypeRef`
    Param {
        /// Parameter name
        name: String,
    },
    /// Written type. Children: none
    TypeRef {
        /// Base type name
        name: String,
        /// `T[]`
        is_array: bool,
        /// `int...`
        is_varargs: bool,
    },

    // Statements
    /// `target = value;` Children: value
    Assign {
        /// Assigned variable
        target: String,
    },
    /// `target[index] = value;` Children: index, value
    ArrayAssign {
        /// Assigned array variable
        target: String,
    },
    /// `return value;` Children: value (absent for `return;`)
    Return,
    /// Children: condition, then-statement, else-statement?
    If,
    /// Children: condition, body
    While,
    /// `{ ... }` Children: statements
    Block,
    /// `expr;` Children: expression
    ExprStmt,

    // Expressions
    /// Integer literal
    IntLiteral {
        /// Value
        value: i32,
    },
    /// `true` / `false`
    BoolLiteral {
        /// Value
        value: bool,
    },
    /// Variable reference
    VarRef {
        /// Referenced name
        name: String,
    },
    /// Children: lhs, rhs
    Binary {
        /// Operator
        op: BinaryOp,
    },
    /// Children: operand
    Unary {
        /// Operator
        op: UnaryOp,
    },
    /// `receiver.method(args)` Children: receiver, args*
    MethodCall {
        /// Called method name
        method: String,
    },
    /// `object.field` Children: object
    FieldAccess {
        /// Field name
        field: String,
    },
    /// `array[index]` Children: array, index
    ArrayAccess,
    /// `array.length` Children: array
    ArrayLength,
    /// `new int[size]` Children: size
    NewArray,
    /// `[e0, e1, ...]` Children: elements
    ArrayLiteral,
    /// `new C()` Children: none
    NewObject {
        /// Instantiated class
        class: String,
    },
    /// `this`
    This,
    /// `(inner)` Children: inner
    Paren,
}

impl NodeKind {
    /// True for expression kinds
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::IntLiteral { .. }
                | NodeKind::BoolLiteral { .. }
                | NodeKind::VarRef { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Unary { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::FieldAccess { .. }
                | NodeKind::ArrayAccess
                | NodeKind::ArrayLength
                | NodeKind::NewArray
                | NodeKind::ArrayLiteral
                | NodeKind::NewObject { .. }
                | NodeKind::This
                | NodeKind::Paren
        )
    }

    /// True for statement kinds
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Assign { .. }
                | NodeKind::ArrayAssign { .. }
                | NodeKind::Return
                | NodeKind::If
                | NodeKind::While
                | NodeKind::Block
                | NodeKind::ExprStmt
        )
    }

    /// True for integer and boolean literals
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::IntLiteral { .. } | NodeKind::BoolLiteral { .. }
        )
    }

    /// Short label used in diagnostics and logs
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::ImportDecl { .. } => "import",
            NodeKind::ClassDecl { .. } => "class",
            NodeKind::VarDecl { .. } => "variable declaration",
            NodeKind::MethodDecl { .. } => "method",
            NodeKind::Param { .. } => "parameter",
            NodeKind::TypeRef { .. } => "type",
            NodeKind::Assign { .. } => "assignment",
            NodeKind::ArrayAssign { .. } => "array assignment",
            NodeKind::Return => "return",
            NodeKind::If => "if",
            NodeKind::While => "while",
            NodeKind::Block => "block",
            NodeKind::ExprStmt => "expression statement",
            NodeKind::IntLiteral { .. } => "integer literal",
            NodeKind::BoolLiteral { .. } => "boolean literal",
            NodeKind::VarRef { .. } => "variable",
            NodeKind::Binary { .. } => "binary expression",
            NodeKind::Unary { .. } => "unary expression",
            NodeKind::MethodCall { .. } => "method call",
            NodeKind::FieldAccess { .. } => "field access",
            NodeKind::ArrayAccess => "array access",
            NodeKind::ArrayLength => "array length",
            NodeKind::NewArray => "array creation",
            NodeKind::ArrayLiteral => "array literal",
            NodeKind::NewObject { .. } => "object creation",
            NodeKind::This => "this",
            NodeKind::Paren => "parenthesized expression",
        }
    }
}
