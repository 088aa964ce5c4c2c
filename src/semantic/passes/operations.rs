//! Operand types of unary and binary operators

use crate::ast::{BinaryOp, NodeId, NodeKind, UnaryOp};
use crate::semantic::{type_of, AnalysisPass, ExprType, PassContext, Scope, Verdict};
use crate::symbols::Type;
use crate::Result;

/// Operand types of unary and binary operators
///
/// | operator            | operands        |
/// |---------------------|-----------------|
/// | `+ - * /`           | both `int`      |
/// | `< > <= >=`         | both `int`      |
/// | `== !=`             | equal types     |
/// | `&& \|\|`           | both `boolean`  |
/// | `!`                 | `boolean`       |
/// | unary `-`           | `int`           |
pub struct InvalidOperationCheck;

impl AnalysisPass for InvalidOperationCheck {
    fn name(&self) -> &'static str {
        "invalid-operation"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        match tree.kind(node) {
            NodeKind::Binary { op } => {
                let lhs = type_of(tree, tree.child(node, 0)?, scope)?;
                let rhs = type_of(tree, tree.child(node, 1)?, scope)?;
                let verdicts = if op.is_equality() {
                    let same = match (&lhs, &rhs) {
                        (ExprType::Known(l), ExprType::Known(r)) => {
                            if l == r {
                                Verdict::Accepted
                            } else {
                                Verdict::Rejected
                            }
                        }
                        _ => Verdict::Accepted,
                    };
                    [
                        Verdict::of(&lhs, scope, |_| true),
                        Verdict::of(&rhs, scope, |_| true),
                        same,
                    ]
                } else {
                    let accepts = operand_rule(*op);
                    [
                        Verdict::of(&lhs, scope, accepts),
                        Verdict::of(&rhs, scope, accepts),
                        Verdict::Accepted,
                    ]
                };
                if let Some(reason) = unresolved(&verdicts) {
                    cx.error(
                        node,
                        format!("Cannot resolve the type of an operand of `{}`: {}", op, reason),
                    );
                } else if verdicts.contains(&Verdict::Rejected) {
                    cx.error(
                        node,
                        format!(
                            "Invalid operation `{}` between `{}` and `{}`",
                            op, lhs, rhs
                        ),
                    );
                }
            }
            NodeKind::Unary { op } => {
                let operand = type_of(tree, tree.child(node, 0)?, scope)?;
                let verdict = match op {
                    UnaryOp::Not => Verdict::of(&operand, scope, Type::is_boolean),
                    UnaryOp::Neg => Verdict::of(&operand, scope, Type::is_int),
                };
                match verdict {
                    Verdict::Accepted => {}
                    Verdict::Rejected => {
                        cx.error(node, format!("Invalid operation `{}` on `{}`", op, operand))
                    }
                    Verdict::Unresolved(reason) => cx.error(
                        node,
                        format!("Cannot resolve the type of the operand of `{}`: {}", op, reason),
                    ),
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn operand_rule(op: BinaryOp) -> fn(&Type) -> bool {
    if op.is_logical() {
        Type::is_boolean
    } else {
        Type::is_int
    }
}

fn unresolved(verdicts: &[Verdict]) -> Option<&str> {
    verdicts.iter().find_map(|v| match v {
        Verdict::Unresolved(reason) => Some(reason.as_str()),
        _ => None,
    })
}
