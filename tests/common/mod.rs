//! Shared fixtures for the integration tests

#![allow(dead_code)]

use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
use jmmc::ast::Tree;
use jmmc::compiler::{CompileOptions, CompileResult, Compiler, RegisterMode};

/// `int sum() { a = 1; b = 2; return a + b; }`
pub fn sum_method() -> Method {
    Method::new("sum", TypeSpec::int())
        .local("a", TypeSpec::int())
        .local("b", TypeSpec::int())
        .stmt(Stmt::assign("a", Expr::int(1)))
        .stmt(Stmt::assign("b", Expr::int(2)))
        .returns(Expr::add(Expr::var("a"), Expr::var("b")))
}

/// A well-formed program touching every statement kind
pub fn counter_program() -> Unit {
    Unit::new().import("io").class(
        Class::new("Counter")
            .field("count", TypeSpec::int())
            .field("data", TypeSpec::int_array())
            .method(
                Method::new("add", TypeSpec::int())
                    .param("n", TypeSpec::int())
                    .stmt(Stmt::assign("count", Expr::add(Expr::var("count"), Expr::var("n"))))
                    .returns(Expr::var("count")),
            )
            .method(
                Method::new("sum", TypeSpec::int())
                    .param("xs", TypeSpec::varargs())
                    .local("total", TypeSpec::int())
                    .local("i", TypeSpec::int())
                    .stmt(Stmt::assign("total", Expr::int(0)))
                    .stmt(Stmt::assign("i", Expr::int(0)))
                    .stmt(Stmt::while_loop(
                        Expr::lt(Expr::var("i"), Expr::length(Expr::var("xs"))),
                        Stmt::block(vec![
                            Stmt::assign(
                                "total",
                                Expr::add(
                                    Expr::var("total"),
                                    Expr::index(Expr::var("xs"), Expr::var("i")),
                                ),
                            ),
                            Stmt::assign("i", Expr::add(Expr::var("i"), Expr::int(1))),
                        ]),
                    ))
                    .returns(Expr::var("total")),
            )
            .method(
                Method::new("isEmpty", TypeSpec::boolean())
                    .stmt(Stmt::if_else(
                        Expr::lt(Expr::int(0), Expr::var("count")),
                        Stmt::ret(Expr::bool(false)),
                        Stmt::ret(Expr::bool(true)),
                    ))
                    .returns(Expr::bool(true)),
            )
            .method(
                Method::main()
                    .local("c", TypeSpec::named("Counter"))
                    .stmt(Stmt::assign("c", Expr::new_object("Counter")))
                    .stmt(Stmt::expr(Expr::call(
                        Expr::var("io"),
                        "println",
                        vec![Expr::call(Expr::var("c"), "add", vec![Expr::int(2)])],
                    )))
                    .stmt(Stmt::expr(Expr::call(
                        Expr::var("c"),
                        "sum",
                        vec![Expr::int(1), Expr::int(2), Expr::int(3)],
                    ))),
            ),
    )
}

/// Compile with the given optimization flag and register mode
pub fn compile(tree: &mut Tree, optimize: bool, registers: RegisterMode) -> CompileResult {
    let options = CompileOptions {
        optimize,
        registers,
        parallel_allocation: false,
        ..CompileOptions::default()
    };
    Compiler::new(options).compile(tree)
}
