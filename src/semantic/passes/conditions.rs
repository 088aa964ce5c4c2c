//! `if` and `while` conditions must be boolean

use crate::ast::{NodeId, NodeKind};
use crate::semantic::{type_of, AnalysisPass, PassContext, Scope, Verdict};
use crate::symbols::Type;
use crate::Result;

/// `if` and `while` conditions must be `boolean`
pub struct ConditionCheck;

impl AnalysisPass for ConditionCheck {
    fn name(&self) -> &'static str {
        "condition"
    }

    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()> {
        let tree = cx.tree;
        let keyword = match tree.kind(node) {
            NodeKind::If => "if",
            NodeKind::While => "while",
            _ => return Ok(()),
        };
        let cond = type_of(tree, tree.child(node, 0)?, scope)?;
        match Verdict::of(&cond, scope, Type::is_boolean) {
            Verdict::Accepted => {}
            Verdict::Rejected => cx.error(
                node,
                format!("Non-boolean condition in `{}`: found type `{}`", keyword, cond),
            ),
            Verdict::Unresolved(reason) => cx.error(
                node,
                format!("Cannot resolve the type of the `{}` condition: {}", keyword, reason),
            ),
        }
        Ok(())
    }
}
