//! # Tree optimizer
//!
//! Constant propagation and constant folding over the analyzed tree, run
//! before lowering. Each round propagates then folds; rounds repeat until
//! one changes nothing, so a propagation that exposes a new fold (and the
//! other way round) is always picked up.
//!
//! The optimizer never fails on well-formed input: anything ambiguous,
//! such as a division by zero, is left as written.

mod folding;
mod propagation;

pub use folding::ConstantFolder;
pub use propagation::ConstantPropagator;

use crate::ast::Tree;
use crate::symbols::SymbolTable;
use crate::Result;
use serde::Serialize;
use tracing::debug;

/// What one optimizer run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptimizationStats {
    /// Rounds run, the final no-change round included
    pub rounds: usize,
    /// Variable reads replaced by literals
    pub propagated: usize,
    /// Operators folded into literals
    pub folded: usize,
}

impl OptimizationStats {
    /// True if the tree was modified
    pub fn changed(&self) -> bool {
        self.propagated + self.folded > 0
    }
}

/// Fixpoint driver for propagation and folding
#[derive(Debug, Clone, Copy, Default)]
pub struct Optimizer;

impl Optimizer {
    /// Create an optimizer
    pub fn new() -> Self {
        Self
    }

    /// Optimize `tree` in place
    pub fn optimize(&self, tree: &mut Tree, table: &SymbolTable) -> Result<OptimizationStats> {
        let propagator = ConstantPropagator::new(table);
        let mut stats = OptimizationStats::default();
        loop {
            stats.rounds += 1;
            let propagated = propagator.run(tree)?;
            let folded = ConstantFolder.run(tree)?;
            debug!(round = stats.rounds, propagated, folded, "optimizer round");
            stats.propagated += propagated;
            stats.folded += folded;
            if propagated == 0 && folded == 0 {
                return Ok(stats);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
    use crate::ast::NodeKind;
    use crate::symbols::SymbolTableBuilder;

    #[test]
    fn test_fold_exposes_propagation() {
        let mut tree = Unit::new()
            .class(
                Class::new("A").method(
                    Method::new("m", TypeSpec::int())
                        .local("a", TypeSpec::int())
                        .local("b", TypeSpec::int())
                        .stmt(Stmt::assign("a", Expr::add(Expr::int(1), Expr::int(2))))
                        .stmt(Stmt::assign("b", Expr::mul(Expr::var("a"), Expr::int(2))))
                        .returns(Expr::var("b")),
                ),
            )
            .build();
        let (table, _) = SymbolTableBuilder::new(&tree).build().unwrap();
        let stats = Optimizer::new().optimize(&mut tree, &table).unwrap();

        assert!(stats.changed());
        assert!(stats.rounds >= 3);
        let literals: Vec<i32> = tree
            .descendants(tree.root())
            .into_iter()
            .filter_map(|n| match tree.kind(n) {
                NodeKind::IntLiteral { value } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(literals, vec![3, 6, 6]);
    }

    #[test]
    fn test_noop_on_optimal_tree() {
        let mut tree = Unit::new()
            .class(Class::new("A").method(
                Method::new("m", TypeSpec::int()).param("p", TypeSpec::int()).returns(Expr::var("p")),
            ))
            .build();
        let (table, _) = SymbolTableBuilder::new(&tree).build().unwrap();
        let before = tree.clone();
        let stats = Optimizer::new().optimize(&mut tree, &table).unwrap();
        assert_eq!(stats.rounds, 1);
        assert_eq!(tree, before);
    }
}
