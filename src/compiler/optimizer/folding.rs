//! Constant folding

use crate::ast::{BinaryOp, NodeId, NodeKind, Tree, UnaryOp};
use crate::Result;

/// Replaces operators over literals with the literal result
///
/// Folds `+ - * /` and `<` over two integer literals, `&& ||` over two
/// boolean literals, `!` over a boolean literal and a parenthesized
/// literal. Declines division by zero, and `<` when it is the condition of
/// a `while` loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFolder;

impl ConstantFolder {
    /// Fold the whole tree bottom-up; returns the number of folds
    pub fn run(&self, tree: &mut Tree) -> Result<usize> {
        let mut folded = 0;
        // reverse pre-order: every node after its subtree
        for node in tree.descendants(tree.root()).into_iter().rev() {
            if let Some(kind) = fold(tree, node)? {
                let literal = tree.add(kind, tree.position(node));
                tree.replace(node, literal)?;
                folded += 1;
            }
        }
        Ok(folded)
    }
}

fn fold(tree: &Tree, node: NodeId) -> Result<Option<NodeKind>> {
    let kind = match tree.kind(node) {
        NodeKind::Binary { op } => {
            let lhs = tree.kind(tree.child(node, 0)?);
            let rhs = tree.kind(tree.child(node, 1)?);
            match (lhs, rhs) {
                (NodeKind::IntLiteral { value: a }, NodeKind::IntLiteral { value: b }) => {
                    if *op == BinaryOp::Lt && is_loop_condition(tree, node) {
                        return Ok(None);
                    }
                    fold_int(*op, *a, *b)
                }
                (NodeKind::BoolLiteral { value: a }, NodeKind::BoolLiteral { value: b }) => {
                    match op {
                        BinaryOp::And => Some(NodeKind::BoolLiteral { value: *a && *b }),
                        BinaryOp::Or => Some(NodeKind::BoolLiteral { value: *a || *b }),
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        NodeKind::Unary { op: UnaryOp::Not } => match tree.kind(tree.child(node, 0)?) {
            NodeKind::BoolLiteral { value } => Some(NodeKind::BoolLiteral { value: !*value }),
            _ => None,
        },
        NodeKind::Paren => {
            let inner = tree.kind(tree.child(node, 0)?);
            inner.is_literal().then(|| inner.clone())
        }
        _ => None,
    };
    Ok(kind)
}

fn fold_int(op: BinaryOp, a: i32, b: i32) -> Option<NodeKind> {
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return None,
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Lt => return Some(NodeKind::BoolLiteral { value: a < b }),
        _ => return None,
    };
    Some(NodeKind::IntLiteral { value })
}

/// True if `node`, seen through parentheses, is the condition of a `while`
fn is_loop_condition(tree: &Tree, node: NodeId) -> bool {
    let mut cur = node;
    while let Some(parent) = tree.parent(cur) {
        match tree.kind(parent) {
            NodeKind::Paren => cur = parent,
            NodeKind::While => return tree.children(parent).first() == Some(&cur),
            _ => return false,
        }
    }
    false
}
