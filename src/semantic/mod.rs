//! # Semantic analysis
//!
//! An ordered list of independent checks ([`AnalysisPass`]) over the tree.
//! Every pass sees the whole tree, the read-only [`SymbolTable`] and an
//! explicit [`Scope`] for the method being visited.
//!
//! Analysis is fail-fast: the first pass that reports an error stops the
//! pipeline, and only the reports gathered so far are returned. A pass that
//! fails internally (an [`Error`] or a panic) becomes one error report naming
//! the pass.

mod passes;
mod scope;
mod typing;

pub use passes::{
    default_passes, ArgumentCheck, ArrayOperationCheck, AssignmentCheck, ConditionCheck,
    DeclarationTypeCheck, ImportCheck, InvalidOperationCheck, ReturnCheck,
    UndeclaredVariableCheck,
};
pub use scope::{ExternalTypeAssumption, Resolution, Scope};
pub use typing::{member_owner, type_of, unwrap_parens, ExprType, Owner, Verdict};

use crate::ast::{NodeId, NodeKind, Position, Tree};
use crate::report::{has_errors, Report, Stage};
use crate::symbols::SymbolTable;
use crate::{Error, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Mutable state of one pass run: where reports are collected
pub struct PassContext<'a> {
    /// Tree under analysis
    pub tree: &'a Tree,
    reports: Vec<Report>,
}

impl<'a> PassContext<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            reports: Vec::new(),
        }
    }

    /// Report an error located at `node`
    pub fn error(&mut self, node: NodeId, message: impl Into<String>) {
        self.reports.push(Report::at(self.tree, node, message));
    }

    /// Report an error without a source position
    pub fn error_unlocated(&mut self, message: impl Into<String>) {
        self.reports
            .push(Report::error(Stage::Semantic, Position::UNKNOWN, message));
    }
}

/// One semantic check
pub trait AnalysisPass: Send + Sync {
    /// Name used in logs and in the report of an internal failure
    fn name(&self) -> &'static str;

    /// Check one node. Called for every node in pre-order.
    fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, scope: &Scope<'_>) -> Result<()>;

    /// Table-level checks, run once after the walk
    fn finish(&self, _cx: &mut PassContext<'_>, _scope: &Scope<'_>) -> Result<()> {
        Ok(())
    }
}

/// Runs the passes in order, stopping after the first one with errors
pub struct Analyzer {
    passes: Vec<Box<dyn AnalysisPass>>,
    policy: ExternalTypeAssumption,
}

impl Analyzer {
    /// Analyzer with the nine standard passes
    pub fn new(policy: ExternalTypeAssumption) -> Self {
        Self::with_passes(default_passes(), policy)
    }

    /// Analyzer with a custom pass list
    pub fn with_passes(passes: Vec<Box<dyn AnalysisPass>>, policy: ExternalTypeAssumption) -> Self {
        Self { passes, policy }
    }

    /// Pass names in run order
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Analyze a tree. Returns every report produced up to and including
    /// the first pass that found errors.
    pub fn analyze(&self, tree: &Tree, table: &SymbolTable) -> Vec<Report> {
        let mut reports = Vec::new();
        for pass in &self.passes {
            let name = pass.name();
            debug!(pass = name, "running analysis pass");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                run_pass(pass.as_ref(), tree, table, self.policy)
            }));
            let failure = match outcome {
                Ok((found, result)) => {
                    reports.extend(found);
                    result.err()
                }
                Err(payload) => Some(Error::PassFailed {
                    pass: name,
                    reason: panic_message(payload.as_ref()),
                }),
            };
            if let Some(err) = failure {
                let err = match err {
                    e @ Error::PassFailed { .. } => e,
                    other => Error::PassFailed {
                        pass: name,
                        reason: other.to_string(),
                    },
                };
                warn!(pass = name, error = %err, "analysis pass failed");
                reports.push(Report::from_error(Stage::Semantic, Position::UNKNOWN, err));
                break;
            }
            if has_errors(&reports) {
                debug!(pass = name, reports = reports.len(), "analysis stopped");
                break;
            }
        }
        reports
    }
}

fn run_pass(
    pass: &dyn AnalysisPass,
    tree: &Tree,
    table: &SymbolTable,
    policy: ExternalTypeAssumption,
) -> (Vec<Report>, Result<()>) {
    let mut cx = PassContext::new(tree);
    let scope = Scope::new(table, policy);
    let result = walk(pass, &mut cx, tree.root(), scope).and_then(|_| pass.finish(&mut cx, &scope));
    (cx.reports, result)
}

fn walk<'a>(
    pass: &dyn AnalysisPass,
    cx: &mut PassContext<'_>,
    node: NodeId,
    scope: Scope<'a>,
) -> Result<()> {
    let tree = cx.tree;
    pass.visit(cx, node, &scope)?;
    let mut methods = 0;
    for &child in tree.children(node) {
        let inner = match tree.kind(child) {
            NodeKind::MethodDecl { name, .. } => {
                let index = methods;
                methods += 1;
                scope.enter(index, name)?
            }
            _ => scope,
        };
        walk(pass, cx, child, inner)?;
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
    use crate::symbols::SymbolTableBuilder;

    struct Exploding;

    impl AnalysisPass for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn visit(&self, _: &mut PassContext<'_>, _: NodeId, _: &Scope<'_>) -> Result<()> {
            panic!("kaboom")
        }
    }

    struct Never;

    impl AnalysisPass for Never {
        fn name(&self) -> &'static str {
            "never"
        }

        fn visit(&self, cx: &mut PassContext<'_>, node: NodeId, _: &Scope<'_>) -> Result<()> {
            cx.error(node, "should not run");
            Ok(())
        }
    }

    fn valid_tree() -> Tree {
        Unit::new()
            .class(
                Class::new("A").method(
                    Method::new("f", TypeSpec::int())
                        .local("a", TypeSpec::int())
                        .stmt(Stmt::assign("a", Expr::int(1)))
                        .returns(Expr::var("a")),
                ),
            )
            .build()
    }

    #[test]
    fn test_default_pass_order() {
        let analyzer = Analyzer::new(ExternalTypeAssumption::default());
        assert_eq!(
            analyzer.pass_names(),
            vec![
                "undeclared-variable",
                "invalid-operation",
                "condition",
                "array-operation",
                "return",
                "assignment",
                "argument",
                "import",
                "declaration-type",
            ]
        );
    }

    #[test]
    fn test_valid_program_has_no_reports() {
        let tree = valid_tree();
        let (table, _) = SymbolTableBuilder::new(&tree).build().unwrap();
        let reports = Analyzer::new(ExternalTypeAssumption::default()).analyze(&tree, &table);
        assert!(reports.is_empty(), "{:?}", reports);
    }

    #[test]
    fn test_panicking_pass_becomes_single_report_and_stops() {
        let tree = valid_tree();
        let (table, _) = SymbolTableBuilder::new(&tree).build().unwrap();
        let analyzer = Analyzer::with_passes(
            vec![Box::new(Exploding), Box::new(Never)],
            ExternalTypeAssumption::default(),
        );
        let reports = analyzer.analyze(&tree, &table);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("exploding"));
        assert!(reports[0].message.contains("kaboom"));
        assert!(matches!(reports[0].cause, Some(Error::PassFailed { .. })));
    }

    #[test]
    fn test_duplicate_method_bodies_use_their_own_locals() {
        let tree = Unit::new()
            .class(
                Class::new("A")
                    .method(Method::new("f", TypeSpec::int()).returns(Expr::int(0)))
                    .method(
                        Method::new("f", TypeSpec::int())
                            .local("b", TypeSpec::int())
                            .stmt(Stmt::assign("b", Expr::int(1)))
                            .stmt(Stmt::assign("ghost", Expr::int(2)))
                            .returns(Expr::var("b")),
                    ),
            )
            .build();
        let (table, table_reports) = SymbolTableBuilder::new(&tree).build().unwrap();
        assert_eq!(table_reports.len(), 1);

        let reports = Analyzer::new(ExternalTypeAssumption::default()).analyze(&tree, &table);
        assert_eq!(reports.len(), 1, "{:?}", reports);
        assert!(reports[0].message.contains("`ghost`"));
    }
}
