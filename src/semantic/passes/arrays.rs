//! Array operand checks

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{type_of, AnalysisPass, PassContext, Resolution, Scope, Verdict};
use crate::symbols::Type;
use crate::Result;

/// Array operands: subscripts, `.length`, creation sizes, literal elements
/// and array element stores
pub struct ArrayOperationCheck;

impl AnalysisPass for ArrayOperationCheck {
    fn name(&self) -> &'static str {
        "array-operation"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        match tree.kind(node) {
            NodeKind::ArrayAccess => {
                expect(cx, scope, node, tree.child(node, 0)?, "Subscripted value", is_array)?;
                expect(cx, scope, node, tree.child(node, 1)?, "Array index", Type::is_int)?;
            }
            NodeKind::ArrayLength => {
                expect(cx, scope, node, tree.child(node, 0)?, "`.length` operand", is_array)?;
            }
            NodeKind::NewArray => {
                expect(cx, scope, node, tree.child(node, 0)?, "Array size", Type::is_int)?;
            }
            NodeKind::ArrayLiteral => {
                for &element in tree.children(node) {
                    expect(cx, scope, node, element, "Array element", Type::is_int)?;
                }
            }
            NodeKind::ArrayAssign { target } => {
                let target_is_array = match scope.resolve(target) {
                    Some(Resolution::Symbol(_, sym)) => sym.ty.is_array,
                    // reported as undeclared
                    _ => true,
                };
                if !target_is_array {
                    cx.error(node, format!("Indexed assignment target `{}` is not an array", target));
                }
                expect(cx, scope, node, tree.child(node, 0)?, "Array index", Type::is_int)?;
                expect(cx, scope, node, tree.child(node, 1)?, "Array element", Type::is_int)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn is_array(ty: &Type) -> bool {
    ty.is_array
}

fn expect(
    cx: &mut PassContext<'_>,
    scope: &Scope<'_>,
    at: NodeId,
    operand: NodeId,
    what: &str,
    accepts: fn(&Type) -> bool,
) -> Result<()> {
    let ty = type_of(cx.tree, operand, scope)?;
    match Verdict::of(&ty, scope, accepts) {
        Verdict::Accepted => {}
        Verdict::Rejected => cx.error(at, format!("{} has invalid type `{}`", what, ty)),
        Verdict::Unresolved(reason) => {
            cx.error(at, format!("Cannot resolve the type of {}: {}", what.to_lowercase(), reason))
        }
    }
    Ok(())
}
