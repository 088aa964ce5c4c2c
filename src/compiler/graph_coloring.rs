//! # Graph Coloring Register Allocator
//!
//! Maps the variables of each lowered method to physical registers:
//! 1. Build the interference graph (an edge between every two variables
//!    referenced by the same instruction)
//! 2. Color locals and temporaries greedily, Welsh-Powell style: highest
//!    degree first, each taking the lowest color no colored neighbor holds
//! 3. Lay out registers: `this` in 0, parameters next in declaration
//!    order, then one register per color
//!
//! Parameters and `this` are pinned and never recolored. There is no
//! spilling: a method that needs more colors than a configured limit fails
//! with [`Error::RegisterBudget`].

use super::ir::{IrClass, IrMethod, THIS};
use super::RegisterMode;
use crate::ast::Position;
use crate::report::{Report, Stage};
use crate::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Conservative interference graph of one method
///
/// Nodes are every variable except `this`, in variable-table order.
#[derive(Debug, Clone, Default)]
pub struct InterferenceGraph {
    nodes: Vec<String>,
    edges: HashMap<String, HashSet<String>>,
}

impl InterferenceGraph {
    /// Build the graph of a method
    pub fn build(method: &IrMethod) -> Self {
        let mut graph = Self::default();
        for name in method.vars.names() {
            graph.add_node(name);
        }
        for instr in &method.instructions {
            let vars: Vec<&str> = instr
                .referenced_vars()
                .into_iter()
                .filter(|v| *v != THIS)
                .collect();
            for (i, a) in vars.iter().enumerate() {
                graph.add_node(a);
                for b in &vars[i + 1..] {
                    graph.add_edge(a, b);
                }
            }
        }
        graph
    }

    fn add_node(&mut self, name: &str) {
        if name != THIS && !self.edges.contains_key(name) {
            self.nodes.push(name.to_string());
            self.edges.insert(name.to_string(), HashSet::new());
        }
    }

    fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        if let Some(adj) = self.edges.get_mut(a) {
            adj.insert(b.to_string());
        }
        if let Some(adj) = self.edges.get_mut(b) {
            adj.insert(a.to_string());
        }
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Neighbors of a node
    pub fn neighbors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|adj| adj.iter().map(String::as_str))
    }

    /// Interference degree
    pub fn degree(&self, name: &str) -> usize {
        self.edges.get(name).map_or(0, HashSet::len)
    }

    /// True if `a` and `b` interfere
    pub fn interferes(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).is_some_and(|adj| adj.contains(b))
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum::<usize>() / 2
    }
}

/// Greedy Welsh-Powell coloring of `candidates`
///
/// Candidates are visited by descending degree; ties keep the order of
/// `candidates`. Neighbors outside `candidates` do not constrain the color.
pub fn welsh_powell(graph: &InterferenceGraph, candidates: &[&str]) -> BTreeMap<String, usize> {
    let mut order: Vec<&str> = candidates.to_vec();
    order.sort_by_key(|v| std::cmp::Reverse(graph.degree(v)));

    let mut colors: BTreeMap<String, usize> = BTreeMap::new();
    for var in order {
        let taken: HashSet<usize> = graph
            .neighbors(var)
            .filter_map(|n| colors.get(n).copied())
            .collect();
        let color = (0..).find(|c| !taken.contains(c)).unwrap_or(0);
        colors.insert(var.to_string(), color);
    }
    colors
}

/// Final register layout of one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAssignment {
    /// Physical register of every variable
    pub registers: BTreeMap<String, u32>,
    /// Color of every local and temporary
    pub locals_colors: BTreeMap<String, usize>,
    /// Registers the method needs
    pub register_count: u32,
}

impl RegisterAssignment {
    /// Number of distinct colors given to locals
    pub fn colors_used(&self) -> usize {
        self.locals_colors.values().max().map_or(0, |c| c + 1)
    }
}

/// Graph coloring register allocator
#[derive(Debug, Clone, Copy)]
pub struct GraphColoringAllocator {
    mode: RegisterMode,
}

impl GraphColoringAllocator {
    /// Allocator for a register mode
    pub fn new(mode: RegisterMode) -> Self {
        Self { mode }
    }

    /// Configured mode
    pub fn mode(&self) -> RegisterMode {
        self.mode
    }

    /// Allocate one method. `Ok(None)` when allocation is disabled.
    pub fn allocate(&self, method: &IrMethod) -> Result<Option<RegisterAssignment>> {
        if self.mode == RegisterMode::Disabled {
            return Ok(None);
        }

        let graph = InterferenceGraph::build(method);
        let locals: Vec<&str> = graph
            .nodes()
            .iter()
            .map(String::as_str)
            .filter(|v| !method.is_pinned(v))
            .collect();
        let locals_colors = welsh_powell(&graph, &locals);
        let colors = locals_colors.values().max().map_or(0, |c| c + 1);

        if let RegisterMode::Limit(available) = self.mode {
            if colors > available {
                return Err(Error::RegisterBudget {
                    method: method.name.clone(),
                    required: colors,
                    available,
                });
            }
        }

        let mut registers = BTreeMap::new();
        let mut next = 0u32;
        if !method.is_static {
            registers.insert(THIS.to_string(), 0);
            next = 1;
        }
        for param in method.param_names() {
            registers.insert(param.to_string(), next);
            next += 1;
        }
        for (name, color) in &locals_colors {
            registers.insert(name.clone(), next + *color as u32);
        }

        debug!(
            method = %method.name,
            vars = graph.nodes().len(),
            edges = graph.edge_count(),
            colors,
            "allocated registers"
        );
        Ok(Some(RegisterAssignment {
            registers,
            locals_colors,
            register_count: next + colors as u32,
        }))
    }

    /// Allocate every method of a class
    ///
    /// Methods are independent: a failing method keeps `registers: None`
    /// and contributes one error report, the others are still allocated.
    /// Reports follow method declaration order.
    pub fn allocate_class(&self, class: &mut IrClass, parallel: bool) -> Vec<Report> {
        let results: Vec<Result<Option<RegisterAssignment>>> = if parallel {
            class.methods.par_iter().map(|m| self.allocate(m)).collect()
        } else {
            class.methods.iter().map(|m| self.allocate(m)).collect()
        };

        let mut reports = Vec::new();
        for (method, result) in class.methods.iter_mut().zip(results) {
            match result {
                Ok(assignment) => method.registers = assignment,
                Err(err) => {
                    warn!(method = %method.name, error = %err, "register allocation failed");
                    method.registers = None;
                    reports.push(Report::from_error(
                        Stage::Optimization,
                        Position::UNKNOWN,
                        err,
                    ));
                }
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::compiler::ir::{IrInstruction, IrType, IrVar, Operand, VarTable};

    fn method(params: &[&str], locals: &[&str], instructions: Vec<IrInstruction>) -> IrMethod {
        let mut vars = VarTable::new();
        vars.insert(THIS, IrType::Class("A".into()));
        for name in params.iter().chain(locals) {
            vars.insert(name, IrType::Int);
        }
        IrMethod {
            name: "f".into(),
            is_public: true,
            is_static: false,
            params: params.iter().map(|p| IrVar::new(p, IrType::Int)).collect(),
            return_type: IrType::Int,
            instructions,
            vars,
            registers: None,
        }
    }

    fn add(dst: &str, lhs: &str, rhs: &str) -> IrInstruction {
        IrInstruction::Binary {
            dst: dst.into(),
            op: BinaryOp::Add,
            lhs: Operand::var(lhs),
            rhs: Operand::var(rhs),
        }
    }

    fn mov(dst: &str, value: i32) -> IrInstruction {
        IrInstruction::Move {
            dst: dst.into(),
            src: Operand::Const(value),
        }
    }

    #[test]
    fn test_graph_excludes_this() {
        let m = method(
            &["p"],
            &["a"],
            vec![IrInstruction::GetField {
                dst: "a".into(),
                object: Operand::var(THIS),
                field: "x".into(),
                ty: IrType::Int,
            }],
        );
        let graph = InterferenceGraph::build(&m);
        assert_eq!(graph.nodes(), &["p".to_string(), "a".to_string()]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_non_interfering_locals_share_a_color() {
        let m = method(&[], &["a", "b"], vec![mov("a", 1), mov("b", 2)]);
        let allocator = GraphColoringAllocator::new(RegisterMode::Limit(1));
        let assignment = allocator.allocate(&m).unwrap().unwrap();
        assert_eq!(assignment.locals_colors["a"], 0);
        assert_eq!(assignment.locals_colors["b"], 0);
        assert_eq!(assignment.registers["a"], 1);
        assert_eq!(assignment.register_count, 2);
    }

    #[test]
    fn test_params_are_pinned() {
        let m = method(&["x", "y"], &["t"], vec![add("t", "x", "y")]);
        let assignment = GraphColoringAllocator::new(RegisterMode::Minimize)
            .allocate(&m)
            .unwrap()
            .unwrap();
        assert_eq!(assignment.registers["this"], 0);
        assert_eq!(assignment.registers["x"], 1);
        assert_eq!(assignment.registers["y"], 2);
        assert_eq!(assignment.registers["t"], 3);
        assert!(!assignment.locals_colors.contains_key("x"));
    }

    #[test]
    fn test_limit_exceeded() {
        let m = method(&[], &["a", "b", "c"], vec![add("c", "a", "b")]);
        let err = GraphColoringAllocator::new(RegisterMode::Limit(2))
            .allocate(&m)
            .unwrap_err();
        assert_eq!(
            err,
            Error::RegisterBudget {
                method: "f".into(),
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_highest_degree_colored_first() {
        // hub interferes with everyone, leaves only with the hub
        let m = method(
            &[],
            &["l1", "l2", "hub"],
            vec![add("hub", "l1", "hub"), add("hub", "l2", "hub")],
        );
        let assignment = GraphColoringAllocator::new(RegisterMode::Minimize)
            .allocate(&m)
            .unwrap()
            .unwrap();
        assert_eq!(assignment.locals_colors["hub"], 0);
        assert_eq!(assignment.locals_colors["l1"], 1);
        assert_eq!(assignment.locals_colors["l2"], 1);
        assert_eq!(assignment.colors_used(), 2);
    }

    #[test]
    fn test_disabled_passes_through() {
        let m = method(&[], &["a"], vec![mov("a", 1)]);
        assert_eq!(
            GraphColoringAllocator::new(RegisterMode::Disabled)
                .allocate(&m)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_class_failure_is_per_method() {
        let mut class = IrClass {
            name: "A".into(),
            superclass: "Object".into(),
            imports: vec![],
            fields: vec![],
            methods: vec![
                method(&[], &["a", "b", "c"], vec![add("c", "a", "b")]),
                method(&[], &["a"], vec![mov("a", 1)]),
            ],
        };
        class.methods[1].name = "g".into();
        let reports =
            GraphColoringAllocator::new(RegisterMode::Limit(1)).allocate_class(&mut class, true);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].stage, Stage::Optimization);
        assert!(class.methods[0].registers.is_none());
        assert!(class.methods[1].registers.is_some());
    }
}
