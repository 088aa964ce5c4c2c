//! Static typing of expressions
//!
//! Typing never guesses: an expression is either of a known [`Type`],
//! `External` (its definition is imported and not visible here), or
//! `Unknown` with the reason it could not be resolved.

use super::scope::{Resolution, Scope};
use crate::ast::{BinaryOp, NodeId, NodeKind, Tree, UnaryOp};
use crate::symbols::Type;
use crate::Result;
use std::fmt;

/// Outcome of typing an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprType {
    /// Resolved static type
    Known(Type),
    /// Defined by an import; governed by the external-type policy
    External,
    /// Not resolvable, with the reason
    Unknown(String),
}

impl ExprType {
    /// The known type, if any
    pub fn known(&self) -> Option<&Type> {
        match self {
            ExprType::Known(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::Known(t) => write!(f, "{}", t),
            ExprType::External => f.write_str("<external>"),
            ExprType::Unknown(_) => f.write_str("<unknown>"),
        }
    }
}

/// Result of checking an expression type against an expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Expectation met, or unverifiable and assumed compatible
    Accepted,
    /// Expectation not met
    Rejected,
    /// Type could not be resolved
    Unresolved(String),
}

impl Verdict {
    /// Judge `ty` with `accepts`, applying the scope's external policy
    pub fn of(ty: &ExprType, scope: &Scope<'_>, accepts: impl Fn(&Type) -> bool) -> Self {
        match ty {
            ExprType::Known(t) if accepts(t) => Verdict::Accepted,
            ExprType::Known(_) => Verdict::Rejected,
            ExprType::External if scope.policy.assumes_compatible() => Verdict::Accepted,
            ExprType::External => Verdict::Rejected,
            ExprType::Unknown(reason) => Verdict::Unresolved(reason.clone()),
        }
    }
}

/// Static type of the expression at `node`
pub fn type_of(tree: &Tree, node: NodeId, scope: &Scope<'_>) -> Result<ExprType> {
    let table = scope.table;
    let ty = match tree.kind(node) {
        NodeKind::IntLiteral { .. } => ExprType::Known(Type::int()),
        NodeKind::BoolLiteral { .. } => ExprType::Known(Type::boolean()),
        NodeKind::This => ExprType::Known(scope.class_type()),
        NodeKind::VarRef { name } => match scope.resolve(name) {
            Some(Resolution::Symbol(_, sym)) => ExprType::Known(sym.ty.clone()),
            Some(Resolution::Import) => ExprType::Known(Type::object(name)),
            Some(Resolution::This) => ExprType::Known(scope.class_type()),
            None => ExprType::Unknown(format!("`{}` is not declared", name)),
        },
        NodeKind::Paren => type_of(tree, tree.child(node, 0)?, scope)?,
        NodeKind::Binary { op } => ExprType::Known(binary_result(*op)),
        NodeKind::Unary { op } => ExprType::Known(match op {
            UnaryOp::Not => Type::boolean(),
            UnaryOp::Neg => Type::int(),
        }),
        NodeKind::MethodCall { method } => {
            let receiver = type_of(tree, tree.child(node, 0)?, scope)?;
            match member_owner(&receiver, scope) {
                Owner::Local => match table.return_type(method) {
                    Ok(ret) => ExprType::Known(ret.clone()),
                    Err(_) if table.superclass_is_imported() => ExprType::External,
                    Err(_) => ExprType::Unknown(format!(
                        "method `{}` not found in class `{}`",
                        method, table.class_name
                    )),
                },
                Owner::External => ExprType::External,
                Owner::Invalid(t) => {
                    ExprType::Unknown(format!("method `{}` not found in type `{}`", method, t))
                }
                Owner::Unresolved(reason) => ExprType::Unknown(reason),
            }
        }
        NodeKind::FieldAccess { field } => {
            let object = type_of(tree, tree.child(node, 0)?, scope)?;
            match member_owner(&object, scope) {
                Owner::Local => match table.field(field) {
                    Some(f) => ExprType::Known(f.ty.clone()),
                    None if table.superclass_is_imported() => ExprType::External,
                    None => ExprType::Unknown(format!(
                        "field `{}` not found in class `{}`",
                        field, table.class_name
                    )),
                },
                Owner::External => ExprType::External,
                Owner::Invalid(t) => {
                    ExprType::Unknown(format!("type `{}` has no field `{}`", t, field))
                }
                Owner::Unresolved(reason) => ExprType::Unknown(reason),
            }
        }
        NodeKind::ArrayAccess => match type_of(tree, tree.child(node, 0)?, scope)? {
            ExprType::Known(t) if t.is_array => ExprType::Known(Type::new(&t.name, false)),
            _ => ExprType::Known(Type::int()),
        },
        NodeKind::ArrayLength => ExprType::Known(Type::int()),
        NodeKind::NewArray | NodeKind::ArrayLiteral => ExprType::Known(Type::int_array()),
        NodeKind::NewObject { class } => ExprType::Known(Type::object(class)),
        other => ExprType::Unknown(format!("{} is not an expression", other.label())),
    };
    Ok(ty)
}

/// Result type of a binary operator
pub fn binary_result(op: BinaryOp) -> Type {
    if op.is_arithmetic() {
        Type::int()
    } else {
        Type::boolean()
    }
}

/// Who defines the members of a receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// The class being compiled
    Local,
    /// An imported class (or an imported-by-name static receiver)
    External,
    /// A type without members
    Invalid(Type),
    /// Receiver type unknown
    Unresolved(String),
}

/// Classify a receiver type
pub fn member_owner(receiver: &ExprType, scope: &Scope<'_>) -> Owner {
    let table = scope.table;
    match receiver {
        ExprType::Known(t) if !t.is_array && t.name == table.class_name => Owner::Local,
        ExprType::Known(t) if !t.is_array && table.is_imported(&t.name) => Owner::External,
        ExprType::Known(t) if !t.is_array && table.superclass.as_deref() == Some(&t.name) => {
            Owner::External
        }
        ExprType::Known(t) => Owner::Invalid(t.clone()),
        ExprType::External => Owner::External,
        ExprType::Unknown(reason) => Owner::Unresolved(reason.clone()),
    }
}

/// Strip parentheses around an expression
pub fn unwrap_parens(tree: &Tree, mut node: NodeId) -> NodeId {
    while matches!(tree.kind(node), NodeKind::Paren) {
        match tree.children(node).first() {
            Some(inner) => node = *inner,
            None => break,
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
    use crate::semantic::ExternalTypeAssumption;
    use crate::symbols::SymbolTableBuilder;

    fn expr_type(expr: Expr) -> ExprType {
        let tree = Unit::new()
            .import("io")
            .class(
                Class::new("A")
                    .field("arr", TypeSpec::int_array())
                    .method(
                        Method::new("f", TypeSpec::boolean())
                            .local("x", TypeSpec::int())
                            .stmt(Stmt::expr(expr))
                            .returns(Expr::bool(true)),
                    ),
            )
            .build();
        let (table, _) = SymbolTableBuilder::new(&tree).build().unwrap();
        let scope = Scope::new(&table, ExternalTypeAssumption::AssumeCompatible)
            .enter(0, "f")
            .unwrap();
        let stmt = tree
            .descendants(tree.root())
            .into_iter()
            .find(|n| matches!(tree.kind(*n), NodeKind::ExprStmt))
            .unwrap();
        type_of(&tree, tree.children(stmt)[0], &scope).unwrap()
    }

    #[test]
    fn test_literal_and_operator_types() {
        assert_eq!(expr_type(Expr::int(1)), ExprType::Known(Type::int()));
        assert_eq!(
            expr_type(Expr::lt(Expr::var("x"), Expr::int(1))),
            ExprType::Known(Type::boolean())
        );
        assert_eq!(
            expr_type(Expr::paren(Expr::var("arr"))),
            ExprType::Known(Type::int_array())
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            expr_type(Expr::call(Expr::this(), "f", vec![])),
            ExprType::Known(Type::boolean())
        );
        assert_eq!(
            expr_type(Expr::call(Expr::var("io"), "println", vec![])),
            ExprType::External
        );
        assert!(matches!(
            expr_type(Expr::call(Expr::this(), "missing", vec![])),
            ExprType::Unknown(_)
        ));
    }

    #[test]
    fn test_undeclared_is_unknown() {
        assert!(matches!(expr_type(Expr::var("nope")), ExprType::Unknown(_)));
    }
}
