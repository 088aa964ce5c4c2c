//! Assignment compatibility between value and target

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{type_of, AnalysisPass, ExprType, PassContext, Scope};
use crate::symbols::Type;
use crate::Result;

/// Assigned values must match the target's declared type
///
/// The target is looked up among fields first (not inside static methods),
/// then parameters, then locals. Imported types on either side, and the
/// current class stored into an imported superclass, are governed by the
/// external-type policy.
pub struct AssignmentCheck;

impl AnalysisPass for AssignmentCheck {
    fn name(&self) -> &'static str {
        "assignment"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        let NodeKind::Assign { target } = tree.kind(node) else {
            return Ok(());
        };
        let Some(declared) = target_type(scope, target) else {
            cx.error(
                node,
                format!("Assignment target `{}` is not declared in this scope", target),
            );
            return Ok(());
        };

        match type_of(tree, tree.child(node, 0)?, scope)? {
            ExprType::Known(actual) if scope.is_assignable(&actual, declared) => {}
            ExprType::Known(actual) if is_external_pair(scope, &actual, declared) => {
                if !scope.policy.assumes_compatible() {
                    cx.error(
                        node,
                        format!(
                            "Cannot verify that `{}` is assignable to `{}` (`{}`)",
                            actual, target, declared
                        ),
                    );
                }
            }
            ExprType::Known(actual) => cx.error(
                node,
                format!(
                    "Cannot assign `{}` to `{}` of type `{}`",
                    actual, target, declared
                ),
            ),
            ExprType::External if scope.policy.assumes_compatible() => {}
            ExprType::External => cx.error(
                node,
                format!("Cannot verify the type of the value assigned to `{}`", target),
            ),
            ExprType::Unknown(reason) => cx.error(
                node,
                format!("Cannot resolve the type of the value assigned to `{}`: {}", target, reason),
            ),
        }
        Ok(())
    }
}

fn target_type<'a>(scope: &Scope<'a>, target: &str) -> Option<&'a Type> {
    let method = scope.method?;
    let field = if method.is_static {
        None
    } else {
        scope.table.field(target)
    };
    field
        .or_else(|| method.param(target))
        .or_else(|| method.local(target))
        .map(|sym| &sym.ty)
}

fn is_external_pair(scope: &Scope<'_>, actual: &Type, declared: &Type) -> bool {
    let table = scope.table;
    table.is_imported(&actual.name)
        || table.is_imported(&declared.name)
        || (actual.name == table.class_name && table.superclass_is_imported())
}
