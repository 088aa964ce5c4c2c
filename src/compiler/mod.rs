//! # Compiler pipeline
//!
//! Drives one compilation unit from the front end's tree to register-
//! assigned IR, ready for a bytecode emitter.
//!
//! ## Architecture
//!
//! ```text
//! Tree → Symbol Table → Analysis → (Optimize) → IR → Register Allocation
//! ```
//!
//! Table-building errors are reported and analysis still runs over the
//! flagged table; any error after analysis stops the pipeline. A method whose
//! registers cannot be allocated keeps its IR without an assignment, and
//! the other methods are still allocated.
//!
//! ## Usage
//!
//! ```ignore
//! use jmmc::compiler::{CompileOptions, Compiler, RegisterMode};
//!
//! let options = CompileOptions {
//!     optimize: true,
//!     registers: RegisterMode::Minimize,
//!     ..CompileOptions::default()
//! };
//! let result = Compiler::new(options).compile(&mut tree);
//! for report in &result.reports {
//!     eprintln!("{}", report);
//! }
//! ```

pub mod debug;
pub mod graph_coloring;
pub mod ir;
pub mod optimizer;

pub use debug::{dump_ir, format_class, format_instr, format_method};
pub use graph_coloring::{GraphColoringAllocator, InterferenceGraph, RegisterAssignment};
pub use ir::{IrClass, IrGenerator, IrInstruction, IrMethod, IrType, Operand};
pub use optimizer::{OptimizationStats, Optimizer};

use crate::ast::{NodeId, Position, Tree};
use crate::report::{has_errors, Report, Stage};
use crate::semantic::{Analyzer, ExternalTypeAssumption};
use crate::symbols::{SymbolTable, SymbolTableBuilder};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Register allocation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterMode {
    /// Keep virtual registers, no allocation
    #[default]
    Disabled,
    /// Use as few registers as the coloring allows
    Minimize,
    /// Fail methods whose locals need more than this many registers
    Limit(usize),
}

impl RegisterMode {
    /// Mode from the command-line register flag: `-1` disabled, `0`
    /// minimize, `n > 0` at most `n` registers
    pub fn from_flag(flag: i32) -> Result<Self> {
        match flag {
            -1 => Ok(RegisterMode::Disabled),
            0 => Ok(RegisterMode::Minimize),
            n if n > 0 => Ok(RegisterMode::Limit(n as usize)),
            n => Err(Error::Config(format!(
                "invalid register flag {}: expected -1, 0 or a positive count",
                n
            ))),
        }
    }
}

/// Compilation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Run constant propagation and folding
    pub optimize: bool,
    /// Register allocation mode
    pub registers: RegisterMode,
    /// Policy for types defined by imports
    pub external_types: ExternalTypeAssumption,
    /// Allocate methods on the rayon thread pool
    pub parallel_allocation: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: false,
            registers: RegisterMode::Disabled,
            external_types: ExternalTypeAssumption::AssumeCompatible,
            parallel_allocation: true,
        }
    }
}

impl CompileOptions {
    /// Parse options from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Compilation result
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileResult {
    /// Symbol table, absent when the unit has no class
    pub symbols: Option<SymbolTable>,
    /// Lowered class, absent when an earlier stage failed
    pub ir: Option<IrClass>,
    /// Every diagnostic, in stage order
    pub reports: Vec<Report>,
}

impl CompileResult {
    /// True if IR was produced and no stage reported an error
    pub fn is_success(&self) -> bool {
        self.ir.is_some() && !has_errors(&self.reports)
    }
}

/// Pipeline driver
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a new compiler with options
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Configured options
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a tree. With optimization enabled the tree is rewritten in
    /// place.
    pub fn compile(&self, tree: &mut Tree) -> CompileResult {
        let mut result = CompileResult::default();

        // Phase 1: symbol table
        let (table, table_reports) = match SymbolTableBuilder::new(tree).build() {
            Ok(built) => built,
            Err(err) => {
                let position = error_position(tree, &err);
                result
                    .reports
                    .push(Report::from_error(Stage::Semantic, position, err));
                return result;
            }
        };
        result.reports.extend(table_reports);
        if has_errors(&result.reports) {
            info!(errors = result.reports.len(), "symbol table has errors");
        }

        // Phase 2: analysis, run even after table errors
        let analysis = Analyzer::new(self.options.external_types).analyze(tree, &table);
        result.reports.extend(analysis);
        if has_errors(&result.reports) {
            info!(errors = result.reports.len(), "semantic analysis failed");
            result.symbols = Some(table);
            return result;
        }

        // Phase 3: tree optimization
        if self.options.optimize {
            match Optimizer::new().optimize(tree, &table) {
                Ok(stats) => info!(
                    rounds = stats.rounds,
                    propagated = stats.propagated,
                    folded = stats.folded,
                    "optimized tree"
                ),
                Err(err) => return fail(result, tree, table, err),
            }
        }

        // Phase 4: lowering
        let mut class = match IrGenerator::new(tree, &table).generate() {
            Ok(class) => class,
            Err(err) => return fail(result, tree, table, err),
        };
        debug!(
            class = %class.name,
            methods = class.methods.len(),
            instructions = class.instruction_count(),
            "lowered class"
        );

        // Phase 5: register allocation
        let allocator = GraphColoringAllocator::new(self.options.registers);
        result
            .reports
            .extend(allocator.allocate_class(&mut class, self.options.parallel_allocation));

        info!(
            class = %class.name,
            reports = result.reports.len(),
            "compilation finished"
        );
        result.symbols = Some(table);
        result.ir = Some(class);
        result
    }
}

fn fail(mut result: CompileResult, tree: &Tree, table: SymbolTable, err: Error) -> CompileResult {
    let position = error_position(tree, &err);
    result
        .reports
        .push(Report::from_error(Stage::Optimization, position, err));
    result.symbols = Some(table);
    result
}

/// Source position of the node a malformed-tree error names
fn error_position(tree: &Tree, err: &Error) -> Position {
    match err {
        Error::MalformedTree { node, .. } if *node < tree.len() => {
            tree.position(NodeId(*node as u32))
        }
        _ => Position::UNKNOWN,
    }
}
