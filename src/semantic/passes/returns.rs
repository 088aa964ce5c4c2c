//! Returned values against the declared return type

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{type_of, AnalysisPass, ExprType, PassContext, Scope};
use crate::Result;

/// Returned values must match the declared return type, base name and
/// array-ness
pub struct ReturnCheck;

impl AnalysisPass for ReturnCheck {
    fn name(&self) -> &'static str {
        "return"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        if !matches!(tree.kind(node), NodeKind::Return) {
            return Ok(());
        }
        let Some(method) = scope.method else {
            return Ok(());
        };
        let declared = &method.return_type;

        let Some(&value) = tree.children(node).first() else {
            if !declared.is_void() {
                cx.error(
                    node,
                    format!(
                        "Method `{}` must return a value of type `{}`",
                        method.name, declared
                    ),
                );
            }
            return Ok(());
        };
        if declared.is_void() {
            cx.error(
                node,
                format!("Method `{}` returns void and cannot return a value", method.name),
            );
            return Ok(());
        }

        match type_of(tree, value, scope)? {
            ExprType::Known(actual) if scope.is_assignable(&actual, declared) => {}
            ExprType::Known(actual) => cx.error(
                node,
                format!(
                    "Return type mismatch in `{}`: expected `{}`, found `{}`",
                    method.name, declared, actual
                ),
            ),
            ExprType::External if scope.policy.assumes_compatible() => {}
            ExprType::External => cx.error(
                node,
                format!(
                    "Cannot verify that the value returned by `{}` is `{}`",
                    method.name, declared
                ),
            ),
            ExprType::Unknown(reason) => cx.error(
                node,
                format!("Cannot resolve the type of the value returned by `{}`: {}", method.name, reason),
            ),
        }
        Ok(())
    }
}
