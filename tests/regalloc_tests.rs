//! Register allocation on lowered methods

mod common;

use common::{compile, counter_program, sum_method};
use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
use jmmc::compiler::{GraphColoringAllocator, InterferenceGraph, IrMethod, RegisterMode};
use jmmc::Error;

fn lowered(method: Method) -> IrMethod {
    let mut tree = Unit::new().class(Class::new("A").method(method)).build();
    let result = compile(&mut tree, false, RegisterMode::Disabled);
    assert!(result.is_success(), "{:?}", result.reports);
    result.ir.unwrap().methods.remove(0)
}

/// Two locals that are never referenced by the same instruction
fn disjoint_locals() -> Method {
    Method::new("m", TypeSpec::int())
        .local("a", TypeSpec::int())
        .local("b", TypeSpec::int())
        .stmt(Stmt::assign("a", Expr::int(1)))
        .stmt(Stmt::assign("b", Expr::int(2)))
        .returns(Expr::var("b"))
}

// ====================
// Interference
// ====================

#[test]
fn test_interference_from_lowered_code() {
    let method = lowered(sum_method());
    let graph = InterferenceGraph::build(&method);
    assert_eq!(graph.nodes(), &["a", "b", "tmp0"]);
    assert!(graph.interferes("a", "b"));
    assert!(graph.interferes("a", "tmp0"));
    assert!(graph.interferes("tmp0", "b"));
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn test_disjoint_locals_do_not_interfere() {
    let graph = InterferenceGraph::build(&lowered(disjoint_locals()));
    assert!(!graph.interferes("a", "b"));
    assert_eq!(graph.degree("a"), 0);
}

// ====================
// Modes
// ====================

#[test]
fn test_limit_one_shares_register() {
    let method = lowered(disjoint_locals());
    let assignment = GraphColoringAllocator::new(RegisterMode::Limit(1))
        .allocate(&method)
        .unwrap()
        .unwrap();
    assert_eq!(assignment.locals_colors["a"], 0);
    assert_eq!(assignment.locals_colors["b"], 0);
    assert_eq!(assignment.registers["this"], 0);
    assert_eq!(assignment.registers["a"], 1);
    assert_eq!(assignment.registers["b"], 1);
    assert_eq!(assignment.register_count, 2);
}

#[test]
fn test_limit_exceeded() {
    let method = lowered(sum_method());
    let err = GraphColoringAllocator::new(RegisterMode::Limit(2))
        .allocate(&method)
        .unwrap_err();
    assert_eq!(
        err,
        Error::RegisterBudget {
            method: "sum".into(),
            required: 3,
            available: 2,
        }
    );
    assert!(GraphColoringAllocator::new(RegisterMode::Limit(3))
        .allocate(&method)
        .unwrap()
        .is_some());
}

#[test]
fn test_disabled_mode_allocates_nothing() {
    let method = lowered(sum_method());
    assert_eq!(
        GraphColoringAllocator::new(RegisterMode::Disabled).allocate(&method),
        Ok(None)
    );
    assert_eq!(method.register_of("a"), method.vars.get("a").map(|v| v.virtual_reg));
}

#[test]
fn test_parameters_are_pinned() {
    let method = lowered(
        Method::new("f", TypeSpec::int())
            .param("x", TypeSpec::int())
            .param("y", TypeSpec::int())
            .local("t", TypeSpec::int())
            .stmt(Stmt::assign("t", Expr::add(Expr::var("x"), Expr::var("y"))))
            .returns(Expr::var("t")),
    );
    let assignment = GraphColoringAllocator::new(RegisterMode::Minimize)
        .allocate(&method)
        .unwrap()
        .unwrap();
    assert_eq!(assignment.registers["this"], 0);
    assert_eq!(assignment.registers["x"], 1);
    assert_eq!(assignment.registers["y"], 2);
    assert!(!assignment.locals_colors.contains_key("x"));
    assert!(assignment.registers["t"] >= 3);
}

#[test]
fn test_static_method_starts_at_zero() {
    let mut tree = counter_program().build();
    let result = compile(&mut tree, false, RegisterMode::Minimize);
    let ir = result.ir.unwrap();
    let main = ir.method("main").unwrap();
    let assignment = main.registers.as_ref().unwrap();
    assert!(!assignment.registers.contains_key("this"));
    assert_eq!(assignment.registers["args"], 0);
}

#[test]
fn test_every_method_colored_consistently() {
    let mut tree = counter_program().build();
    let result = compile(&mut tree, true, RegisterMode::Minimize);
    for method in &result.ir.unwrap().methods {
        let graph = InterferenceGraph::build(method);
        let assignment = method.registers.as_ref().unwrap();
        for a in graph.nodes() {
            for b in graph.neighbors(a) {
                assert_ne!(
                    assignment.registers[a.as_str()],
                    assignment.registers[b],
                    "{} and {} share a register in {}",
                    a,
                    b,
                    method.name
                );
            }
        }
    }
}
