//! Error types for the jmmc compiler core

use thiserror::Error;

/// Internal compiler errors
///
/// User-facing problems (type mismatches, undeclared names, ...) are
/// [`Report`](crate::report::Report)s. This enum covers the failures that
/// stop a stage outright; the pipeline turns each of them into a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The compilation unit has no class declaration
    ///
    /// **Triggered by:** a program node whose children are only imports
    #[error("No class declaration found in the compilation unit")]
    MissingClass,

    /// Lookup of a method that is not declared in the class
    #[error("Method not declared in class: {method}")]
    UnknownMethod {
        /// Method name
        method: String,
    },

    /// A name that should have been resolved by the analyzer is unknown
    #[error("Unresolved symbol: {name}")]
    UnresolvedSymbol {
        /// Symbol name
        name: String,
    },

    /// The tree does not have the child layout its node kind requires
    ///
    /// **Triggered by:** front ends that build a binary node with one child,
    /// an assignment with no value, ...
    #[error("Malformed tree at node {node}: {reason}")]
    MalformedTree {
        /// Arena index of the offending node
        node: usize,
        /// What was expected
        reason: String,
    },

    /// Register allocation needs more registers than the configured limit
    #[error("Method {method} needs at least {required} registers for its locals, only {available} available")]
    RegisterBudget {
        /// Method name
        method: String,
        /// Registers the coloring required
        required: usize,
        /// Configured limit
        available: usize,
    },

    /// An analysis pass failed internally
    #[error("Analysis pass {pass} failed: {reason}")]
    PassFailed {
        /// Pass name
        pass: &'static str,
        /// Failure description
        reason: String,
    },

    /// Invalid compiler configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a malformed-tree error for a node index
    pub fn malformed(node: usize, reason: impl Into<String>) -> Self {
        Error::MalformedTree {
            node,
            reason: reason.into(),
        }
    }
}

/// Result type for jmmc operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_budget_message() {
        let err = Error::RegisterBudget {
            method: "foo".to_string(),
            required: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Method foo needs at least 3 registers for its locals, only 2 available"
        );
    }
}
