//! # jmmc - Compiler Core for a Small Class-Based Language
//!
//! The middle and back end of a compiler for a single-class, single-
//! inheritance object-oriented language with `int`, `boolean`, `int[]` and
//! class types. Given the syntax tree from a front end, jmmc
//!
//! - builds the symbol table ([`symbols`])
//! - runs nine fail-fast semantic checks ([`semantic`])
//! - optionally propagates and folds constants to a fixpoint
//!   ([`compiler::optimizer`])
//! - lowers every method to three-address IR with labels ([`compiler::ir`])
//! - assigns physical registers by graph coloring
//!   ([`compiler::graph_coloring`])
//!
//! Parsing and bytecode emission are done by other tools.
//!
//! ## Quick Start
//!
//! ```rust
//! use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
//! use jmmc::compiler::{CompileOptions, Compiler, IrInstruction, Operand, RegisterMode};
//!
//! let mut tree = Unit::new()
//!     .class(
//!         Class::new("Calc").method(
//!             Method::new("sum", TypeSpec::int())
//!                 .local("a", TypeSpec::int())
//!                 .local("b", TypeSpec::int())
//!                 .stmt(Stmt::assign("a", Expr::int(1)))
//!                 .stmt(Stmt::assign("b", Expr::int(2)))
//!                 .returns(Expr::add(Expr::var("a"), Expr::var("b"))),
//!         ),
//!     )
//!     .build();
//!
//! let options = CompileOptions {
//!     optimize: true,
//!     registers: RegisterMode::Minimize,
//!     ..CompileOptions::default()
//! };
//! let result = Compiler::new(options).compile(&mut tree);
//! assert!(result.is_success());
//!
//! let ir = result.ir.unwrap();
//! let sum = ir.method("sum").unwrap();
//! assert_eq!(
//!     sum.instructions.last(),
//!     Some(&IrInstruction::Return(Some(Operand::Const(3))))
//! );
//! ```
//!
//! ## Error Handling
//!
//! Problems in the compiled program are [`report::Report`]s, never panics
//! or `Err`s. Internal failures ([`Error`]) are turned into reports at the
//! stage boundary:
//!
//! ```rust
//! use jmmc::ast::builder::{Class, Expr, Method, Stmt, TypeSpec, Unit};
//! use jmmc::compiler::{CompileOptions, Compiler};
//!
//! let mut tree = Unit::new()
//!     .class(
//!         Class::new("A").method(
//!             Method::new("f", TypeSpec::int())
//!                 .stmt(Stmt::if_then(Expr::int(5), Stmt::block(vec![])))
//!                 .returns(Expr::int(0)),
//!         ),
//!     )
//!     .build();
//!
//! let result = Compiler::new(CompileOptions::default()).compile(&mut tree);
//! assert!(!result.is_success());
//! assert_eq!(result.reports.len(), 1);
//! assert!(result.reports[0].message.contains("`int`"));
//! ```
//!
//! ## Logging
//!
//! Every stage logs through `tracing` (`debug!` per pass, round and method,
//! `info!` per stage). The library installs no subscriber.

#![warn(missing_docs)]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ast;
pub mod compiler;
pub mod error;
pub mod report;
pub mod semantic;
pub mod symbols;

pub use error::{Error, Result};
pub use report::{Report, Severity, Stage};
