//! Tests for the symbol table and the analysis passes

mod common;

use common::counter_program;
use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
use jmmc::semantic::{Analyzer, ExternalTypeAssumption};
use jmmc::symbols::{SymbolKind, SymbolTableBuilder, Type};
use jmmc::Report;

fn analyze(unit: Unit) -> anyhow::Result<Vec<Report>> {
    let tree = unit.build();
    let (table, table_reports) = SymbolTableBuilder::new(&tree).build()?;
    anyhow::ensure!(table_reports.is_empty(), "table errors: {:?}", table_reports);
    Ok(Analyzer::new(ExternalTypeAssumption::AssumeCompatible).analyze(&tree, &table))
}

fn single_method(method: Method) -> Unit {
    Unit::new().import("io").class(
        Class::new("A")
            .field("f", TypeSpec::int())
            .field("arr", TypeSpec::int_array())
            .method(method),
    )
}

// ====================
// Symbol Table
// ====================

#[test]
fn test_table_contents() -> anyhow::Result<()> {
    let tree = counter_program().build();
    let (table, reports) = SymbolTableBuilder::new(&tree).build()?;
    assert!(reports.is_empty());

    assert_eq!(table.class_name, "Counter");
    assert_eq!(table.superclass, None);
    assert!(table.is_imported("io"));
    assert_eq!(table.return_type("add")?, &Type::int());
    assert_eq!(table.parameters("add")?.len(), 1);
    assert_eq!(table.local_variables("sum")?.len(), 2);

    let main = table.signature("main")?;
    assert!(main.is_main());
    assert_eq!(main.params[0].ty, Type::string_array());

    let (kind, symbol) = table.resolve("sum", "xs").unwrap();
    assert_eq!(kind, SymbolKind::Param);
    assert!(symbol.ty.is_int_array());
    assert!(symbol.is_varargs);
    Ok(())
}

#[test]
fn test_unknown_method_lookup_fails() -> anyhow::Result<()> {
    let tree = counter_program().build();
    let (table, _) = SymbolTableBuilder::new(&tree).build()?;
    assert!(table.signature("nope").is_err());
    assert!(!table.has_method("nope"));
    Ok(())
}

#[test]
fn test_duplicate_local_reported() -> anyhow::Result<()> {
    let tree = single_method(
        Method::new("m", TypeSpec::int())
            .local("x", TypeSpec::int())
            .local("x", TypeSpec::boolean())
            .returns(Expr::int(0)),
    )
    .build();
    let (_, reports) = SymbolTableBuilder::new(&tree).build()?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("`x`"));
    Ok(())
}

// ====================
// Accepted Programs
// ====================

#[test]
fn test_well_formed_program_has_no_reports() -> anyhow::Result<()> {
    assert!(analyze(counter_program())?.is_empty());
    Ok(())
}

#[test]
fn test_varargs_accepts_single_array() -> anyhow::Result<()> {
    let unit = Unit::new().class(
        Class::new("A")
            .field("arr", TypeSpec::int_array())
            .method(
                Method::new("total", TypeSpec::int())
                    .param("xs", TypeSpec::varargs())
                    .returns(Expr::length(Expr::var("xs"))),
            )
            .method(
                Method::new("m", TypeSpec::int())
                    .returns(Expr::call(Expr::this(), "total", vec![Expr::var("arr")])),
            ),
    );
    assert!(analyze(unit)?.is_empty());
    Ok(())
}

#[test]
fn test_imported_calls_assumed_compatible() -> anyhow::Result<()> {
    let unit = single_method(
        Method::new("m", TypeSpec::int())
            .local("x", TypeSpec::int())
            .stmt(Stmt::assign(
                "x",
                Expr::call(Expr::var("io"), "read", vec![Expr::bool(true)]),
            ))
            .returns(Expr::var("x")),
    );
    assert!(analyze(unit)?.is_empty());
    Ok(())
}

// ====================
// Rejected Programs
// ====================

#[test]
fn test_analysis_is_fail_fast() -> anyhow::Result<()> {
    // undeclared variable (first pass) and a non-boolean condition (third)
    let reports = analyze(single_method(
        Method::new("m", TypeSpec::int())
            .stmt(Stmt::if_then(Expr::int(1), Stmt::assign("ghost", Expr::int(2))))
            .returns(Expr::int(0)),
    ))?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("`ghost`"));
    Ok(())
}

#[test]
fn test_pass_collects_every_error() -> anyhow::Result<()> {
    let reports = analyze(single_method(
        Method::new("m", TypeSpec::int())
            .stmt(Stmt::assign("a", Expr::int(1)))
            .stmt(Stmt::assign("b", Expr::int(2)))
            .returns(Expr::int(0)),
    ))?;
    assert_eq!(reports.len(), 2);
    Ok(())
}

#[test]
fn test_invalid_operation() -> anyhow::Result<()> {
    let reports = analyze(single_method(
        Method::new("m", TypeSpec::int()).returns(Expr::add(Expr::var("arr"), Expr::int(1))),
    ))?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("int[]"));
    Ok(())
}

#[test]
fn test_index_on_non_array() -> anyhow::Result<()> {
    let reports = analyze(single_method(
        Method::new("m", TypeSpec::int()).returns(Expr::index(Expr::var("f"), Expr::int(0))),
    ))?;
    assert_eq!(reports.len(), 1);
    Ok(())
}

#[test]
fn test_wrong_return_type() -> anyhow::Result<()> {
    let reports = analyze(single_method(
        Method::new("m", TypeSpec::int()).returns(Expr::bool(true)),
    ))?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("`m`"));
    Ok(())
}

#[test]
fn test_wrong_assignment_type() -> anyhow::Result<()> {
    let reports = analyze(single_method(
        Method::new("m", TypeSpec::int())
            .local("i", TypeSpec::int())
            .stmt(Stmt::assign("i", Expr::bool(false)))
            .returns(Expr::var("i")),
    ))?;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].message, "Cannot assign `boolean` to `i` of type `int`");
    Ok(())
}

#[test]
fn test_wrong_argument_count() -> anyhow::Result<()> {
    let unit = Unit::new().class(
        Class::new("A")
            .method(
                Method::new("two", TypeSpec::int())
                    .param("a", TypeSpec::int())
                    .param("b", TypeSpec::int())
                    .returns(Expr::var("a")),
            )
            .method(
                Method::new("m", TypeSpec::int())
                    .returns(Expr::call(Expr::this(), "two", vec![Expr::int(1)])),
            ),
    );
    let reports = analyze(unit)?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("expects 2 arguments, found 1"));
    Ok(())
}

#[test]
fn test_duplicate_import() -> anyhow::Result<()> {
    let unit = Unit::new()
        .import("a.B")
        .import("a.B")
        .class(Class::new("A").method(Method::new("m", TypeSpec::int()).returns(Expr::int(0))));
    let reports = analyze(unit)?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("`a.B`"));
    Ok(())
}

#[test]
fn test_unsupported_field_type() -> anyhow::Result<()> {
    let unit = Unit::new().class(
        Class::new("A")
            .field("w", TypeSpec::named("Widget"))
            .method(Method::new("m", TypeSpec::int()).returns(Expr::int(0))),
    );
    let reports = analyze(unit)?;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].message, "Unsupported type `Widget` for field");
    Ok(())
}

#[test]
fn test_field_in_static_method() -> anyhow::Result<()> {
    let unit = Unit::new().class(
        Class::new("A")
            .field("count", TypeSpec::int())
            .method(Method::main().stmt(Stmt::assign("count", Expr::int(1)))),
    );
    let reports = analyze(unit)?;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("static"));
    Ok(())
}
