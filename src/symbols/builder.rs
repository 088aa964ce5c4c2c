//! Symbol table construction from the syntax tree

use super::{MethodSignature, Symbol, SymbolTable, Type, MAIN_METHOD};
use crate::ast::{NodeId, NodeKind, Tree};
use crate::report::Report;
use crate::{Error, Result};
use std::collections::HashSet;
use tracing::debug;

/// Extracts [`SymbolTable`]s from trees
///
/// Duplicate names are reported once per repeated name and per scope, but
/// kept in the table so later checks still see the offending symbol.
pub struct SymbolTableBuilder<'t> {
    tree: &'t Tree,
    reports: Vec<Report>,
}

impl<'t> SymbolTableBuilder<'t> {
    /// Create a builder over a tree
    pub fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            reports: Vec::new(),
        }
    }

    /// Build the table. Fails only when the unit has no class.
    pub fn build(mut self) -> Result<(SymbolTable, Vec<Report>)> {
        let tree = self.tree;
        let root = tree.root();

        let class = tree
            .children(root)
            .iter()
            .copied()
            .find(|c| matches!(tree.kind(*c), NodeKind::ClassDecl { .. }))
            .ok_or(Error::MissingClass)?;
        let (class_name, superclass) = match tree.kind(class) {
            NodeKind::ClassDecl { name, superclass } => (name.clone(), superclass.clone()),
            _ => return Err(Error::MissingClass),
        };

        let mut table = SymbolTable::new(&class_name, superclass.as_deref());
        table.imports = self.imports(root);

        let mut field_nodes = Vec::new();
        let mut method_nodes = Vec::new();
        for &child in tree.children(class) {
            match tree.kind(child) {
                NodeKind::VarDecl { .. } => field_nodes.push(child),
                NodeKind::MethodDecl { .. } => method_nodes.push(child),
                _ => {}
            }
        }

        table.fields = self.declarations(&field_nodes, "field", None)?;

        let mut seen_methods = HashSet::new();
        let mut reported_methods = HashSet::new();
        for method in method_nodes {
            let signature = self.method(method)?;
            if !seen_methods.insert(signature.name.clone())
                && reported_methods.insert(signature.name.clone())
            {
                self.reports.push(Report::at(
                    tree,
                    method,
                    format!("Duplicate method `{}`", signature.name),
                ));
            }
            table.add_method(signature);
        }

        debug!(
            class = %table.class_name,
            imports = table.imports.len(),
            fields = table.fields.len(),
            methods = table.methods.len(),
            errors = self.reports.len(),
            "built symbol table"
        );
        Ok((table, self.reports))
    }

    fn imports(&self, root: NodeId) -> Vec<String> {
        self.tree
            .children(root)
            .iter()
            .filter_map(|c| match self.tree.kind(*c) {
                NodeKind::ImportDecl { path } => Some(
                    path.iter()
                        .map(|seg| seg.trim_matches('"').to_string())
                        .collect::<Vec<_>>()
                        .join("."),
                ),
                _ => None,
            })
            .collect()
    }

    fn method(&mut self, method: NodeId) -> Result<MethodSignature> {
        let tree = self.tree;
        let (name, is_public, is_static) = match tree.kind(method) {
            NodeKind::MethodDecl {
                name,
                is_public,
                is_static,
            } => (name.clone(), *is_public, *is_static),
            _ => return Err(Error::malformed(method.index(), "expected a method")),
        };

        let mut return_type = None;
        let mut params = Vec::new();
        let mut locals = Vec::new();
        for &child in tree.children(method) {
            match tree.kind(child) {
                NodeKind::TypeRef { .. } => return_type = Some(type_of(tree, child)?.0),
                NodeKind::Param { .. } => params.push(child),
                NodeKind::VarDecl { .. } => locals.push(child),
                _ => {}
            }
        }

        let return_type = match return_type {
            Some(ty) => ty,
            None if is_static && name == MAIN_METHOD => Type::void(),
            None => {
                self.reports.push(Report::at(
                    tree,
                    method,
                    format!("Method `{}` has no return type", name),
                ));
                Type::void()
            }
        };

        let scope = format!("method `{}`", name);
        let params = self.declarations(&params, "parameter", Some(&scope))?;
        let locals = self.declarations(&locals, "local variable", Some(&scope))?;

        Ok(MethodSignature {
            name,
            return_type,
            params,
            locals,
            is_public,
            is_static,
        })
    }

    fn declarations(
        &mut self,
        nodes: &[NodeId],
        what: &str,
        scope: Option<&str>,
    ) -> Result<Vec<Symbol>> {
        let tree = self.tree;
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut out = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let name = match tree.kind(node) {
                NodeKind::VarDecl { name } | NodeKind::Param { name } => name.clone(),
                _ => return Err(Error::malformed(node.index(), "expected a declaration")),
            };
            let (ty, is_varargs) = type_of(tree, tree.child(node, 0)?)?;
            if !seen.insert(name.clone()) && reported.insert(name.clone()) {
                let message = match scope {
                    Some(scope) => format!("Duplicate {} `{}` in {}", what, name, scope),
                    None => format!("Duplicate {} `{}`", what, name),
                };
                self.reports.push(Report::at(tree, node, message));
            }
            out.push(Symbol {
                name,
                ty,
                is_varargs,
            });
        }
        Ok(out)
    }
}

/// Read a `TypeRef` node. Variadic types are integer arrays.
pub(crate) fn type_of(tree: &Tree, node: NodeId) -> Result<(Type, bool)> {
    match tree.kind(node) {
        NodeKind::TypeRef {
            name,
            is_array,
            is_varargs,
        } => Ok((Type::new(name, *is_array || *is_varargs), *is_varargs)),
        other => Err(Error::malformed(
            node.index(),
            format!("expected a type, found {}", other.label()),
        )),
    }
}
