//! Declared types of fields, parameters and locals

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{AnalysisPass, PassContext, Scope};
use crate::Result;

/// Written types of fields, locals, parameters and return types
///
/// Base names must be `int`, `boolean`, the class, its superclass or an
/// import. `int...` is only legal as the last parameter, `void` only as a
/// return type and `String` only as the parameter of the static entry method.
pub struct DeclarationTypeCheck;

#[derive(Clone, Copy, PartialEq)]
enum Slot {
    Field,
    Local,
    Param { last: bool },
    Return,
}

impl Slot {
    fn describe(self) -> &'static str {
        match self {
            Slot::Field => "field",
            Slot::Local => "local variable",
            Slot::Param { .. } => "parameter",
            Slot::Return => "return type",
        }
    }
}

impl AnalysisPass for DeclarationTypeCheck {
    fn name(&self) -> &'static str {
        "declaration-type"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        let NodeKind::TypeRef {
            name,
            is_array,
            is_varargs,
        } = tree.kind(node)
        else {
            return Ok(());
        };
        let Some(parent) = tree.parent(node) else {
            return Ok(());
        };
        let slot = match tree.kind(parent) {
            NodeKind::MethodDecl { .. } => Slot::Return,
            NodeKind::Param { .. } => {
                let method = tree.parent(parent);
                let last_param = method.and_then(|m| {
                    tree.children(m)
                        .iter()
                        .rev()
                        .find(|c| matches!(tree.kind(**c), NodeKind::Param { .. }))
                        .copied()
                });
                Slot::Param {
                    last: last_param == Some(parent),
                }
            }
            NodeKind::VarDecl { .. } => match tree.parent(parent).map(|p| tree.kind(p)) {
                Some(NodeKind::ClassDecl { .. }) => Slot::Field,
                _ => Slot::Local,
            },
            _ => return Ok(()),
        };
        let what = slot.describe();

        if *is_varargs {
            match slot {
                Slot::Param { last: true } => {}
                Slot::Param { last: false } => {
                    cx.error(node, "Variadic parameter must be the last parameter")
                }
                _ => cx.error(node, format!("Variadic type is not allowed for a {}", what)),
            }
            if name != "int" {
                cx.error(node, format!("Variadic type must be `int...`, found `{}...`", name));
            }
            return Ok(());
        }

        let supported = match name.as_str() {
            "void" => slot == Slot::Return && !*is_array,
            "String" => {
                matches!(slot, Slot::Param { .. })
                    && scope.method.is_some_and(|m| m.is_main())
            }
            other => scope.is_known_type_name(other),
        };
        if !supported {
            let written = if *is_array {
                format!("{}[]", name)
            } else {
                name.clone()
            };
            cx.error(node, format!("Unsupported type `{}` for {}", written, what));
        }
        Ok(())
    }
}
