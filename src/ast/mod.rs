//! # Syntax tree
//!
//! The tree is produced by an external front end. The core reads it through
//! the arena API in [`tree`] and the closed [`NodeKind`] enum, and the
//! optimizer rewrites it with [`Tree::replace`].

pub mod builder;
mod node;
mod tree;

pub use node::{BinaryOp, NodeKind, Position, UnaryOp};
pub use tree::{Node, NodeId, Tree};
