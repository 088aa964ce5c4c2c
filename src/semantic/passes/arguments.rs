//! Call arity and argument types against local signatures

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{member_owner, type_of, AnalysisPass, ExprType, Owner, PassContext, Scope};
use crate::symbols::{MethodSignature, Type};
use crate::Result;

/// Calls must name a declared method with matching arguments
///
/// Calls on imported receivers, and calls to undeclared methods when the
/// superclass is imported, cannot be checked locally and follow the
/// external-type policy. A trailing `int...` parameter accepts any number of
/// `int` arguments, or a single `int[]`.
pub struct ArgumentCheck;

impl AnalysisPass for ArgumentCheck {
    fn name(&self) -> &'static str {
        "argument"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        let NodeKind::MethodCall { method } = tree.kind(node) else {
            return Ok(());
        };
        let table = scope.table;
        let receiver = type_of(tree, tree.child(node, 0)?, scope)?;

        let signature = match member_owner(&receiver, scope) {
            Owner::Local => match table.signature(method) {
                Ok(sig) => sig,
                Err(_) if table.superclass_is_imported() => {
                    return external(cx, node, method, scope);
                }
                Err(_) => {
                    cx.error(
                        node,
                        format!("Method `{}` not found in class `{}`", method, table.class_name),
                    );
                    return Ok(());
                }
            },
            Owner::External => return external(cx, node, method, scope),
            Owner::Invalid(ty) => {
                cx.error(node, format!("Method `{}` not found in type `{}`", method, ty));
                return Ok(());
            }
            Owner::Unresolved(reason) => {
                cx.error(
                    node,
                    format!("Cannot resolve the receiver of `{}`: {}", method, reason),
                );
                return Ok(());
            }
        };

        let mut args = Vec::new();
        for &arg in tree.children(node).iter().skip(1) {
            args.push(type_of(tree, arg, scope)?);
        }
        check_arguments(cx, node, signature, &args, scope);
        Ok(())
    }
}

fn external(cx: &mut PassContext<'_>, node: NodeId, method: &str, scope: &Scope<'_>) -> Result<()> {
    if !scope.policy.assumes_compatible() {
        cx.error(
            node,
            format!("Cannot verify the call to `{}` on an imported type", method),
        );
    }
    Ok(())
}

fn check_arguments(
    cx: &mut PassContext<'_>,
    node: NodeId,
    sig: &MethodSignature,
    args: &[ExprType],
    scope: &Scope<'_>,
) {
    let fixed = if sig.has_varargs() {
        sig.params.len() - 1
    } else {
        sig.params.len()
    };
    let count_ok = if sig.has_varargs() {
        args.len() >= fixed
    } else {
        args.len() == fixed
    };
    if !count_ok {
        let expected = if sig.has_varargs() {
            format!("at least {}", fixed)
        } else {
            fixed.to_string()
        };
        cx.error(
            node,
            format!(
                "Method `{}` expects {} arguments, found {}",
                sig.name,
                expected,
                args.len()
            ),
        );
        return;
    }

    for (i, (arg, param)) in args.iter().zip(&sig.params[..fixed]).enumerate() {
        if !argument_matches(arg, &param.ty, scope) {
            cx.error(
                node,
                format!(
                    "Argument {} of `{}` has type `{}`, expected `{}`",
                    i + 1,
                    sig.name,
                    arg,
                    param.ty
                ),
            );
        }
    }

    if sig.has_varargs() {
        let rest = &args[fixed..];
        let single_array = rest.len() == 1 && matches!(&rest[0], ExprType::Known(t) if t.is_int_array());
        if !single_array {
            for (i, arg) in rest.iter().enumerate() {
                if !argument_matches(arg, &Type::int(), scope) {
                    cx.error(
                        node,
                        format!(
                            "Argument {} of `{}` has type `{}`, expected `int`",
                            fixed + i + 1,
                            sig.name,
                            arg
                        ),
                    );
                }
            }
        }
    }
}

fn argument_matches(arg: &ExprType, param: &Type, scope: &Scope<'_>) -> bool {
    match arg {
        ExprType::Known(t) => scope.is_assignable(t, param),
        ExprType::External => scope.policy.assumes_compatible(),
        ExprType::Unknown(_) => false,
    }
}
