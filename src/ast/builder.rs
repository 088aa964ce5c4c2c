//! Value-level description of a compilation unit
//!
//! Front ends (and tests) describe a program with these plain values and
//! call [`Unit::build`] to get an arena [`Tree`]. Positions are synthetic:
//! every declaration and statement gets the next line, expressions share
//! their statement's line with increasing columns.
//!
//! ```
//! use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
//!
//! let tree = Unit::new()
//!     .import("io")
//!     .class(
//!         Class::new("Calc").method(
//!             Method::new("sum", TypeSpec::int())
//!                 .local("a", TypeSpec::int())
//!                 .stmt(Stmt::assign("a", Expr::int(1)))
//!                 .returns(Expr::add(Expr::var("a"), Expr::int(2))),
//!         ),
//!     )
//!     .build();
//! assert!(tree.len() > 5);
//! ```

use super::node::{BinaryOp, NodeKind, Position, UnaryOp};
use super::tree::{NodeId, Tree};

/// Written type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    /// Base name
    pub name: String,
    /// `T[]`
    pub is_array: bool,
    /// `int...`
    pub is_varargs: bool,
}

impl TypeSpec {
    /// Named scalar type
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_array: false,
            is_varargs: false,
        }
    }

    /// `int`
    pub fn int() -> Self {
        Self::named("int")
    }

    /// `boolean`
    pub fn boolean() -> Self {
        Self::named("boolean")
    }

    /// `int[]`
    pub fn int_array() -> Self {
        Self::named("int").array()
    }

    /// `int...`
    pub fn varargs() -> Self {
        Self {
            name: "int".to_string(),
            is_array: true,
            is_varargs: true,
        }
    }

    /// `String[]`
    pub fn string_array() -> Self {
        Self::named("String").array()
    }

    /// Array of this type
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }
}

/// Expression description
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal
    Int(i32),
    /// Boolean literal
    Bool(bool),
    /// Variable reference
    Var(String),
    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Unary operation
    Unary(UnaryOp, Box<Expr>),
    /// Method call
    Call {
        /// Receiver expression
        receiver: Box<Expr>,
        /// Method name
        method: String,
        /// Arguments
        args: Vec<Expr>,
    },
    /// `object.field`
    Field(Box<Expr>, String),
    /// `array[index]`
    Index(Box<Expr>, Box<Expr>),
    /// `array.length`
    Length(Box<Expr>),
    /// `new int[size]`
    NewArray(Box<Expr>),
    /// `[e0, e1, ...]`
    ArrayLit(Vec<Expr>),
    /// `new C()`
    New(String),
    /// `this`
    This,
    /// `(inner)`
    Paren(Box<Expr>),
}

impl Expr {
    /// Integer literal
    pub fn int(value: i32) -> Self {
        Expr::Int(value)
    }

    /// Boolean literal
    pub fn bool(value: bool) -> Self {
        Expr::Bool(value)
    }

    /// Variable reference
    pub fn var(name: &str) -> Self {
        Expr::Var(name.to_string())
    }

    /// Binary operation
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// `lhs + rhs`
    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    /// `lhs - rhs`
    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Sub, lhs, rhs)
    }

    /// `lhs * rhs`
    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Mul, lhs, rhs)
    }

    /// `lhs / rhs`
    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Div, lhs, rhs)
    }

    /// `lhs < rhs`
    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Lt, lhs, rhs)
    }

    /// `lhs && rhs`
    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::And, lhs, rhs)
    }

    /// `lhs || rhs`
    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Or, lhs, rhs)
    }

    /// `!operand`
    pub fn not(operand: Expr) -> Self {
        Expr::Unary(UnaryOp::Not, Box::new(operand))
    }

    /// `-operand`
    pub fn neg(operand: Expr) -> Self {
        Expr::Unary(UnaryOp::Neg, Box::new(operand))
    }

    /// `receiver.method(args)`
    pub fn call(receiver: Expr, method: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            receiver: Box::new(receiver),
            method: method.to_string(),
            args,
        }
    }

    /// `object.field`
    pub fn field(object: Expr, field: &str) -> Self {
        Expr::Field(Box::new(object), field.to_string())
    }

    /// `array[index]`
    pub fn index(array: Expr, index: Expr) -> Self {
        Expr::Index(Box::new(array), Box::new(index))
    }

    /// `array.length`
    pub fn length(array: Expr) -> Self {
        Expr::Length(Box::new(array))
    }

    /// `new int[size]`
    pub fn new_array(size: Expr) -> Self {
        Expr::NewArray(Box::new(size))
    }

    /// `[e0, e1, ...]`
    pub fn array(elements: Vec<Expr>) -> Self {
        Expr::ArrayLit(elements)
    }

    /// `new C()`
    pub fn new_object(class: &str) -> Self {
        Expr::New(class.to_string())
    }

    /// `this`
    pub fn this() -> Self {
        Expr::This
    }

    /// `(inner)`
    pub fn paren(inner: Expr) -> Self {
        Expr::Paren(Box::new(inner))
    }
}

/// Statement description
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = value;`
    Assign(String, Expr),
    /// `target[index] = value;`
    ArrayAssign(String, Expr, Expr),
    /// `return value;`
    Return(Option<Expr>),
    /// `if (cond) then else otherwise`
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    /// `while (cond) body`
    While(Expr, Box<Stmt>),
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// `expr;`
    Expr(Expr),
}

impl Stmt {
    /// `target = value;`
    pub fn assign(target: &str, value: Expr) -> Self {
        Stmt::Assign(target.to_string(), value)
    }

    /// `target[index] = value;`
    pub fn array_assign(target: &str, index: Expr, value: Expr) -> Self {
        Stmt::ArrayAssign(target.to_string(), index, value)
    }

    /// `return value;`
    pub fn ret(value: Expr) -> Self {
        Stmt::Return(Some(value))
    }

    /// `if (cond) then`
    pub fn if_then(cond: Expr, then: Stmt) -> Self {
        Stmt::If(cond, Box::new(then), None)
    }

    /// `if (cond) then else otherwise`
    pub fn if_else(cond: Expr, then: Stmt, otherwise: Stmt) -> Self {
        Stmt::If(cond, Box::new(then), Some(Box::new(otherwise)))
    }

    /// `while (cond) body`
    pub fn while_loop(cond: Expr, body: Stmt) -> Self {
        Stmt::While(cond, Box::new(body))
    }

    /// `{ ... }`
    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(stmts)
    }

    /// `expr;`
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }
}

/// Method description
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Name
    pub name: String,
    /// `public`
    pub is_public: bool,
    /// `static`
    pub is_static: bool,
    /// Written return type; `None` for the static entry method
    pub return_type: Option<TypeSpec>,
    /// Parameters in order
    pub params: Vec<(String, TypeSpec)>,
    /// Local declarations in order
    pub locals: Vec<(String, TypeSpec)>,
    /// Body statements
    pub body: Vec<Stmt>,
}

impl Method {
    /// Public instance method
    pub fn new(name: &str, return_type: TypeSpec) -> Self {
        Self {
            name: name.to_string(),
            is_public: true,
            is_static: false,
            return_type: Some(return_type),
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
        }
    }

    /// `public static void main(String[] args)`
    pub fn main() -> Self {
        Self {
            name: "main".to_string(),
            is_public: true,
            is_static: true,
            return_type: None,
            params: vec![("args".to_string(), TypeSpec::string_array())],
            locals: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Drop the `public` modifier
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Remove the written return type
    pub fn without_return_type(mut self) -> Self {
        self.return_type = None;
        self
    }

    /// Append a parameter
    pub fn param(mut self, name: &str, ty: TypeSpec) -> Self {
        self.params.push((name.to_string(), ty));
        self
    }

    /// Append a local declaration
    pub fn local(mut self, name: &str, ty: TypeSpec) -> Self {
        self.locals.push((name.to_string(), ty));
        self
    }

    /// Append a statement
    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }

    /// Append a `return value;`
    pub fn returns(self, value: Expr) -> Self {
        self.stmt(Stmt::ret(value))
    }
}

/// Class description
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Class name
    pub name: String,
    /// Superclass name
    pub superclass: Option<String>,
    /// Fields in order
    pub fields: Vec<(String, TypeSpec)>,
    /// Methods in order
    pub methods: Vec<Method>,
}

impl Class {
    /// Empty class
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    /// Append a field
    pub fn field(mut self, name: &str, ty: TypeSpec) -> Self {
        self.fields.push((name.to_string(), ty));
        self
    }

    /// Append a method
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
}

/// Compilation unit description
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unit {
    /// Dotted import names
    pub imports: Vec<String>,
    /// Classes; the first one is compiled
    pub classes: Vec<Class>,
}

impl Unit {
    /// Empty unit
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an import (`"a.b.C"`)
    pub fn import(mut self, dotted: &str) -> Self {
        self.imports.push(dotted.to_string());
        self
    }

    /// Append a class
    pub fn class(mut self, class: Class) -> Self {
        self.classes.push(class);
        self
    }

    /// Lower the description into an arena tree
    pub fn build(&self) -> Tree {
        let mut b = TreeWriter {
            tree: Tree::program(),
            line: 1,
            column: 1,
        };
        let root = b.tree.root();
        for import in &self.imports {
            let pos = b.next_line();
            let path = import.split('.').map(str::to_string).collect();
            b.tree.add_child(root, NodeKind::ImportDecl { path }, pos);
        }
        for class in &self.classes {
            b.class(root, class);
        }
        b.tree
    }
}

struct TreeWriter {
    tree: Tree,
    line: i32,
    column: i32,
}

impl TreeWriter {
    fn next_line(&mut self) -> Position {
        self.line += 1;
        self.column = 1;
        Position::new(self.line, self.column)
    }

    fn next_column(&mut self) -> Position {
        self.column += 2;
        Position::new(self.line, self.column)
    }

    fn class(&mut self, parent: NodeId, class: &Class) {
        let pos = self.next_line();
        let id = self.tree.add_child(
            parent,
            NodeKind::ClassDecl {
                name: class.name.clone(),
                superclass: class.superclass.clone(),
            },
            pos,
        );
        for (name, ty) in &class.fields {
            self.declaration(id, NodeKind::VarDecl { name: name.clone() }, ty);
        }
        for method in &class.methods {
            self.method(id, method);
        }
    }

    fn declaration(&mut self, parent: NodeId, kind: NodeKind, ty: &TypeSpec) {
        let pos = self.next_line();
        let id = self.tree.add_child(parent, kind, pos);
        self.type_ref(id, ty);
    }

    fn type_ref(&mut self, parent: NodeId, ty: &TypeSpec) {
        let pos = self.next_column();
        self.tree.add_child(
            parent,
            NodeKind::TypeRef {
                name: ty.name.clone(),
                is_array: ty.is_array,
                is_varargs: ty.is_varargs,
            },
            pos,
        );
    }

    fn method(&mut self, parent: NodeId, method: &Method) {
        let pos = self.next_line();
        let id = self.tree.add_child(
            parent,
            NodeKind::MethodDecl {
                name: method.name.clone(),
                is_public: method.is_public,
                is_static: method.is_static,
            },
            pos,
        );
        if let Some(ret) = &method.return_type {
            self.type_ref(id, ret);
        }
        for (name, ty) in &method.params {
            self.declaration(id, NodeKind::Param { name: name.clone() }, ty);
        }
        for (name, ty) in &method.locals {
            self.declaration(id, NodeKind::VarDecl { name: name.clone() }, ty);
        }
        for stmt in &method.body {
            self.stmt(id, stmt);
        }
    }

    fn stmt(&mut self, parent: NodeId, stmt: &Stmt) {
        let pos = self.next_line();
        match stmt {
            Stmt::Assign(target, value) => {
                let id = self.tree.add_child(
                    parent,
                    NodeKind::Assign {
                        target: target.clone(),
                    },
                    pos,
                );
                self.expr(id, value);
            }
            Stmt::ArrayAssign(target, index, value) => {
                let id = self.tree.add_child(
                    parent,
                    NodeKind::ArrayAssign {
                        target: target.clone(),
                    },
                    pos,
                );
                self.expr(id, index);
                self.expr(id, value);
            }
            Stmt::Return(value) => {
                let id = self.tree.add_child(parent, NodeKind::Return, pos);
                if let Some(value) = value {
                    self.expr(id, value);
                }
            }
            Stmt::If(cond, then, otherwise) => {
                let id = self.tree.add_child(parent, NodeKind::If, pos);
                self.expr(id, cond);
                self.stmt(id, then);
                if let Some(otherwise) = otherwise {
                    self.stmt(id, otherwise);
                }
            }
            Stmt::While(cond, body) => {
                let id = self.tree.add_child(parent, NodeKind::While, pos);
                self.expr(id, cond);
                self.stmt(id, body);
            }
            Stmt::Block(stmts) => {
                let id = self.tree.add_child(parent, NodeKind::Block, pos);
                for s in stmts {
                    self.stmt(id, s);
                }
            }
            Stmt::Expr(expr) => {
                let id = self.tree.add_child(parent, NodeKind::ExprStmt, pos);
                self.expr(id, expr);
            }
        }
    }

    fn expr(&mut self, parent: NodeId, expr: &Expr) {
        let pos = self.next_column();
        let kind = match expr {
            Expr::Int(value) => NodeKind::IntLiteral { value: *value },
            Expr::Bool(value) => NodeKind::BoolLiteral { value: *value },
            Expr::Var(name) => NodeKind::VarRef { name: name.clone() },
            Expr::Binary(op, _, _) => NodeKind::Binary { op: *op },
            Expr::Unary(op, _) => NodeKind::Unary { op: *op },
            Expr::Call { method, .. } => NodeKind::MethodCall {
                method: method.clone(),
            },
            Expr::Field(_, field) => NodeKind::FieldAccess {
                field: field.clone(),
            },
            Expr::Index(_, _) => NodeKind::ArrayAccess,
            Expr::Length(_) => NodeKind::ArrayLength,
            Expr::NewArray(_) => NodeKind::NewArray,
            Expr::ArrayLit(_) => NodeKind::ArrayLiteral,
            Expr::New(class) => NodeKind::NewObject {
                class: class.clone(),
            },
            Expr::This => NodeKind::This,
            Expr::Paren(_) => NodeKind::Paren,
        };
        let id = self.tree.add_child(parent, kind, pos);
        match expr {
            Expr::Binary(_, lhs, rhs) | Expr::Index(lhs, rhs) => {
                self.expr(id, lhs);
                self.expr(id, rhs);
            }
            Expr::Unary(_, inner)
            | Expr::Field(inner, _)
            | Expr::Length(inner)
            | Expr::NewArray(inner)
            | Expr::Paren(inner) => self.expr(id, inner),
            Expr::Call { receiver, args, .. } => {
                self.expr(id, receiver);
                for arg in args {
                    self.expr(id, arg);
                }
            }
            Expr::ArrayLit(elements) => {
                for e in elements {
                    self.expr(id, e);
                }
            }
            Expr::Int(_) | Expr::Bool(_) | Expr::Var(_) | Expr::New(_) | Expr::This => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_layout() {
        let tree = Unit::new()
            .import("a.b.C")
            .class(
                Class::new("A").field("x", TypeSpec::int()).method(
                    Method::new("f", TypeSpec::boolean())
                        .param("p", TypeSpec::int())
                        .returns(Expr::bool(true)),
                ),
            )
            .build();

        let root = tree.root();
        let top = tree.children(root);
        assert_eq!(top.len(), 2);
        assert_eq!(
            tree.kind(top[0]),
            &NodeKind::ImportDecl {
                path: vec!["a".into(), "b".into(), "C".into()]
            }
        );
        let class = top[1];
        let method = tree.children(class)[1];
        let kinds: Vec<_> = tree
            .children(method)
            .iter()
            .map(|c| tree.kind(*c).label())
            .collect();
        assert_eq!(kinds, vec!["type", "parameter", "return"]);
    }

    #[test]
    fn test_positions_increase() {
        let tree = Unit::new()
            .class(Class::new("A").field("x", TypeSpec::int()).field("y", TypeSpec::int()))
            .build();
        let class = tree.children(tree.root())[0];
        let fields = tree.children(class);
        assert!(tree.position(fields[0]).line < tree.position(fields[1]).line);
    }
}
