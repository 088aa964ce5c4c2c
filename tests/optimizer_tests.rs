//! Tests for constant propagation and folding on whole methods

mod common;

use common::sum_method;
use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
use jmmc::ast::{NodeKind, Tree};
use jmmc::compiler::optimizer::{ConstantFolder, ConstantPropagator, Optimizer};
use jmmc::symbols::SymbolTableBuilder;

fn optimize(method: Method) -> anyhow::Result<Tree> {
    let mut tree = Unit::new()
        .class(Class::new("A").field("f", TypeSpec::int()).method(method))
        .build();
    let (table, _) = SymbolTableBuilder::new(&tree).build()?;
    Optimizer::new().optimize(&mut tree, &table)?;
    Ok(tree)
}

fn ints(tree: &Tree) -> Vec<i32> {
    tree.descendants(tree.root())
        .into_iter()
        .filter_map(|n| match tree.kind(n) {
            NodeKind::IntLiteral { value } => Some(*value),
            _ => None,
        })
        .collect()
}

fn bools(tree: &Tree) -> Vec<bool> {
    tree.descendants(tree.root())
        .into_iter()
        .filter_map(|n| match tree.kind(n) {
            NodeKind::BoolLiteral { value } => Some(*value),
            _ => None,
        })
        .collect()
}

fn binaries(tree: &Tree) -> usize {
    tree.descendants(tree.root())
        .into_iter()
        .filter(|&n| matches!(tree.kind(n), NodeKind::Binary { .. }))
        .count()
}

// ====================
// Folding
// ====================

#[test]
fn test_sum_folds_to_three() -> anyhow::Result<()> {
    let tree = optimize(sum_method())?;
    assert_eq!(ints(&tree), vec![1, 2, 3]);
    assert_eq!(binaries(&tree), 0);
    Ok(())
}

#[test]
fn test_nested_arithmetic() -> anyhow::Result<()> {
    let tree = optimize(Method::new("m", TypeSpec::int()).returns(Expr::mul(
        Expr::paren(Expr::add(Expr::int(2), Expr::int(3))),
        Expr::sub(Expr::int(10), Expr::int(4)),
    )))?;
    assert_eq!(ints(&tree), vec![30]);
    Ok(())
}

#[test]
fn test_division_by_zero_left_alone() -> anyhow::Result<()> {
    let tree = optimize(
        Method::new("m", TypeSpec::int()).returns(Expr::div(Expr::int(7), Expr::int(0))),
    )?;
    assert_eq!(binaries(&tree), 1);
    Ok(())
}

#[test]
fn test_overflow_wraps() -> anyhow::Result<()> {
    let tree = optimize(
        Method::new("m", TypeSpec::int()).returns(Expr::add(Expr::int(i32::MAX), Expr::int(1))),
    )?;
    assert_eq!(ints(&tree), vec![i32::MIN]);
    Ok(())
}

#[test]
fn test_boolean_logic() -> anyhow::Result<()> {
    let tree = optimize(Method::new("m", TypeSpec::boolean()).returns(Expr::and(
        Expr::not(Expr::bool(false)),
        Expr::or(Expr::bool(false), Expr::lt(Expr::int(1), Expr::int(2))),
    )))?;
    assert_eq!(bools(&tree), vec![true]);
    Ok(())
}

#[test]
fn test_if_condition_folds_but_while_does_not() -> anyhow::Result<()> {
    let tree = optimize(
        Method::new("m", TypeSpec::int())
            .stmt(Stmt::if_then(
                Expr::lt(Expr::int(1), Expr::int(2)),
                Stmt::assign("f", Expr::int(0)),
            ))
            .stmt(Stmt::while_loop(
                Expr::paren(Expr::lt(Expr::int(3), Expr::int(4))),
                Stmt::assign("f", Expr::int(1)),
            ))
            .returns(Expr::int(0)),
    )?;
    assert_eq!(bools(&tree), vec![true]);
    assert_eq!(binaries(&tree), 1);
    Ok(())
}

// ====================
// Propagation
// ====================

#[test]
fn test_chain_reaches_fixpoint() -> anyhow::Result<()> {
    let tree = optimize(
        Method::new("m", TypeSpec::int())
            .local("a", TypeSpec::int())
            .local("b", TypeSpec::int())
            .local("c", TypeSpec::int())
            .stmt(Stmt::assign("a", Expr::int(2)))
            .stmt(Stmt::assign("b", Expr::mul(Expr::var("a"), Expr::var("a"))))
            .stmt(Stmt::assign("c", Expr::add(Expr::var("b"), Expr::var("a"))))
            .returns(Expr::var("c")),
    )?;
    assert_eq!(ints(&tree), vec![2, 4, 6, 6]);
    Ok(())
}

#[test]
fn test_loop_variable_not_propagated() -> anyhow::Result<()> {
    let tree = optimize(
        Method::new("m", TypeSpec::int())
            .local("i", TypeSpec::int())
            .stmt(Stmt::assign("i", Expr::int(0)))
            .stmt(Stmt::while_loop(
                Expr::lt(Expr::var("i"), Expr::int(10)),
                Stmt::assign("i", Expr::add(Expr::var("i"), Expr::int(1))),
            ))
            .returns(Expr::var("i")),
    )?;
    let refs = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&n| matches!(tree.kind(n), NodeKind::VarRef { name } if name == "i"))
        .count();
    assert_eq!(refs, 3);
    Ok(())
}

#[test]
fn test_single_steps_report_counts() -> anyhow::Result<()> {
    let mut tree = Unit::new().class(Class::new("A").method(sum_method())).build();
    let (table, _) = SymbolTableBuilder::new(&tree).build()?;

    assert_eq!(ConstantPropagator::new(&table).run(&mut tree)?, 2);
    assert_eq!(ConstantFolder.run(&mut tree)?, 1);
    assert_eq!(ConstantPropagator::new(&table).run(&mut tree)?, 0);
    assert_eq!(ConstantFolder.run(&mut tree)?, 0);
    Ok(())
}

#[test]
fn test_stats() -> anyhow::Result<()> {
    let mut tree = Unit::new().class(Class::new("A").method(sum_method())).build();
    let (table, _) = SymbolTableBuilder::new(&tree).build()?;
    let stats = Optimizer::new().optimize(&mut tree, &table)?;
    assert_eq!(stats.rounds, 2);
    assert_eq!(stats.propagated, 2);
    assert_eq!(stats.folded, 1);
    assert!(stats.changed());
    Ok(())
}
