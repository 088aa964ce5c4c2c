//! Diagnostics produced by every stage of the compiler

use crate::ast::{NodeId, Position, Tree};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage that produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Front end
    Syntactic,
    /// Symbol table and analysis passes
    Semantic,
    /// Optimizer, lowering and register allocation
    Optimization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Syntactic => "syntactic",
            Stage::Semantic => "semantic",
            Stage::Optimization => "optimization",
        })
    }
}

/// Report severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Halts the pipeline (analysis) or the failing method (allocation)
    Error,
    /// Informational
    Log,
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Producing stage
    pub stage: Stage,
    /// Line, -1 when unknown
    pub line: i32,
    /// Column, -1 when unknown
    pub column: i32,
    /// Human-readable message
    pub message: String,
    /// Internal error this report was created from
    #[serde(skip)]
    pub cause: Option<Error>,
    /// Severity
    pub severity: Severity,
}

impl Report {
    /// Error report at a position
    pub fn error(stage: Stage, position: Position, message: impl Into<String>) -> Self {
        Self {
            stage,
            line: position.line,
            column: position.column,
            message: message.into(),
            cause: None,
            severity: Severity::Error,
        }
    }

    /// Informational report at a position
    pub fn log(stage: Stage, position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Log,
            ..Self::error(stage, position, message)
        }
    }

    /// Semantic error located at a tree node
    pub fn at(tree: &Tree, node: NodeId, message: impl Into<String>) -> Self {
        Self::error(Stage::Semantic, tree.position(node), message)
    }

    /// Error report created from an internal failure
    pub fn from_error(stage: Stage, position: Position, error: Error) -> Self {
        Self {
            cause: Some(error.clone()),
            ..Self::error(stage, position, error.to_string())
        }
    }

    /// True for error severity
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Log => "log",
        };
        write!(
            f,
            "{} [{}] {}:{}: {}",
            severity, self.stage, self.line, self.column, self.message
        )
    }
}

/// True if any report has error severity
pub fn has_errors(reports: &[Report]) -> bool {
    reports.iter().any(Report::is_error)
}
