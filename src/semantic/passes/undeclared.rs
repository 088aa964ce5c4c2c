//! Names that resolve to no declaration, and `this` or fields in static code

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{AnalysisPass, PassContext, Resolution, Scope};
use crate::symbols::SymbolKind;
use crate::Result;

/// Every variable reference and assignment target must resolve
///
/// References resolve to a parameter, a local, a field, an import name or
/// `this`. Assignment targets must be a parameter, a local or a field.
/// `this` and fields are rejected inside static methods.
pub struct UndeclaredVariableCheck;

impl AnalysisPass for UndeclaredVariableCheck {
    fn name(&self) -> &'static str {
        "undeclared-variable"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        match cx.tree.kind(node) {
            NodeKind::VarRef { name } => match scope.resolve(name) {
                Some(Resolution::This) if scope.in_static() => {
                    cx.error(node, "`this` cannot be used in a static method")
                }
                Some(Resolution::Symbol(SymbolKind::Field, _)) if scope.in_static() => cx.error(
                    node,
                    format!("Field `{}` cannot be used in a static method", name),
                ),
                Some(_) => {}
                None => cx.error(node, format!("Variable `{}` is not declared", name)),
            },
            NodeKind::This if scope.in_static() => {
                cx.error(node, "`this` cannot be used in a static method")
            }
            NodeKind::Assign { target } | NodeKind::ArrayAssign { target } => {
                match scope.resolve(target) {
                    Some(Resolution::Symbol(SymbolKind::Field, _)) if scope.in_static() => cx
                        .error(
                            node,
                            format!("Field `{}` cannot be used in a static method", target),
                        ),
                    Some(Resolution::Symbol(..)) => {}
                    _ => cx.error(
                        node,
                        format!("Assignment target `{}` is not declared", target),
                    ),
                }
            }
            _ => {}
        }
        Ok(())
    }
}
