//! Constant propagation

use crate::ast::{NodeId, NodeKind, Tree};
use crate::symbols::SymbolTable;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Replaces reads of locals and parameters holding a known literal
///
/// Statements are walked in order per method. An assignment of a literal
/// records the variable's value; any other assignment forgets it. A
/// variable assigned anywhere inside an `if` or `while` is never
/// propagated in that method, wherever the assignment sits.
pub struct ConstantPropagator<'a> {
    table: &'a SymbolTable,
}

/// Per-method propagation state
#[derive(Debug, Default)]
struct MethodState {
    tracked: HashSet<String>,
    branch_modified: HashSet<String>,
    constants: HashMap<String, NodeId>,
    replaced: usize,
}

impl MethodState {
    fn propagates(&self, name: &str) -> bool {
        self.tracked.contains(name) && !self.branch_modified.contains(name)
    }
}

impl<'a> ConstantPropagator<'a> {
    /// Propagator over a class's symbol table
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// Propagate through every method; returns the number of replaced reads
    pub fn run(&self, tree: &mut Tree) -> Result<usize> {
        let root = tree.root();
        let class = tree
            .children(root)
            .iter()
            .copied()
            .find(|c| matches!(tree.kind(*c), NodeKind::ClassDecl { .. }))
            .ok_or(Error::MissingClass)?;

        let methods: Vec<(NodeId, String)> = tree
            .children(class)
            .iter()
            .filter_map(|&c| match tree.kind(c) {
                NodeKind::MethodDecl { name, .. } => Some((c, name.clone())),
                _ => None,
            })
            .collect();

        let mut replaced = 0;
        for (index, (method, name)) in methods.into_iter().enumerate() {
            let signature = self.table.declared(index, &name)?;
            let mut state = MethodState {
                tracked: signature
                    .params
                    .iter()
                    .chain(&signature.locals)
                    .map(|s| s.name.clone())
                    .collect(),
                branch_modified: branch_assignments(tree, method),
                ..MethodState::default()
            };
            let body: Vec<NodeId> = tree
                .children(method)
                .iter()
                .copied()
                .filter(|c| tree.kind(*c).is_statement())
                .collect();
            for stmt in body {
                statement(tree, stmt, &mut state)?;
            }
            replaced += state.replaced;
        }
        Ok(replaced)
    }
}

/// Names assigned inside any `if` or `while` of a method
fn branch_assignments(tree: &Tree, method: NodeId) -> HashSet<String> {
    let mut names = HashSet::new();
    for node in tree.descendants(method) {
        if matches!(tree.kind(node), NodeKind::If | NodeKind::While) {
            for inner in tree.descendants(node) {
                if let NodeKind::Assign { target } = tree.kind(inner) {
                    names.insert(target.clone());
                }
            }
        }
    }
    names
}

fn statement(tree: &mut Tree, node: NodeId, state: &mut MethodState) -> Result<()> {
    match tree.kind(node).clone() {
        NodeKind::Assign { target } => {
            substitute(tree, tree.child(node, 0)?, state)?;
            let value = tree.child(node, 0)?;
            if state.propagates(&target) && tree.kind(value).is_literal() {
                state.constants.insert(target, value);
            } else {
                state.constants.remove(&target);
            }
        }
        NodeKind::If | NodeKind::While => {
            let children = tree.children(node).to_vec();
            if let Some((&cond, branches)) = children.split_first() {
                substitute(tree, cond, state)?;
                for &branch in branches {
                    statement(tree, branch, state)?;
                }
            }
        }
        NodeKind::Block => {
            for stmt in tree.children(node).to_vec() {
                statement(tree, stmt, state)?;
            }
        }
        NodeKind::ArrayAssign { .. } | NodeKind::Return | NodeKind::ExprStmt => {
            for expr in tree.children(node).to_vec() {
                substitute(tree, expr, state)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Replace every propagatable variable read inside `expr`
fn substitute(tree: &mut Tree, expr: NodeId, state: &mut MethodState) -> Result<()> {
    for node in tree.descendants(expr) {
        let literal = match tree.kind(node) {
            NodeKind::VarRef { name } if state.propagates(name) => state.constants.get(name),
            _ => None,
        };
        if let Some(&literal) = literal {
            let copy = tree.deep_copy(literal);
            tree.replace(node, copy)?;
            state.replaced += 1;
        }
    }
    Ok(())
}
