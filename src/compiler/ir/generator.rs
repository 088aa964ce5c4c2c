//! IR Generator - lowers the analyzed tree to an [`IrClass`]
//!
//! Statements are lowered here; expressions in [`super::expr`]. Every
//! method gets its own [`MethodLowering`] with a fresh variable table and
//! name generator, so temporaries and labels restart at zero per method.

use super::instruction::{IrInstruction, Operand};
use super::names::NameGen;
use super::program::{IrClass, IrMethod, IrVar, VarTable, DEFAULT_SUPERCLASS, THIS};
use super::types::IrType;
use crate::ast::{NodeId, NodeKind, Tree};
use crate::symbols::{MethodSignature, SymbolKind, SymbolTable};
use crate::{Error, Result};
use tracing::debug;

/// IR Generator - transforms the analyzed tree into one [`IrClass`]
pub struct IrGenerator<'a> {
    tree: &'a Tree,
    table: &'a SymbolTable,
}

impl<'a> IrGenerator<'a> {
    /// Generator over an analyzed tree and its symbol table
    pub fn new(tree: &'a Tree, table: &'a SymbolTable) -> Self {
        Self { tree, table }
    }

    /// Lower the class. Methods keep their declaration order.
    pub fn generate(&self) -> Result<IrClass> {
        let tree = self.tree;
        let class = tree
            .children(tree.root())
            .iter()
            .copied()
            .find(|c| matches!(tree.kind(*c), NodeKind::ClassDecl { .. }))
            .ok_or(Error::MissingClass)?;

        let mut methods = Vec::new();
        for &child in tree.children(class) {
            if let NodeKind::MethodDecl { name, .. } = tree.kind(child) {
                let signature = self.table.declared(methods.len(), name)?;
                let method = MethodLowering::new(tree, self.table, signature).lower(child)?;
                debug!(
                    method = %method.name,
                    instructions = method.instructions.len(),
                    vars = method.vars.len(),
                    "lowered method"
                );
                methods.push(method);
            }
        }

        let table = self.table;
        Ok(IrClass {
            name: table.class_name.clone(),
            superclass: table
                .superclass
                .clone()
                .unwrap_or_else(|| DEFAULT_SUPERCLASS.to_string()),
            imports: table.imports.clone(),
            fields: table
                .fields
                .iter()
                .map(|f| IrVar::new(&f.name, IrType::from(&f.ty)))
                .collect(),
            methods,
        })
    }
}

/// Lowering state of one method
pub(super) struct MethodLowering<'a> {
    pub(super) tree: &'a Tree,
    pub(super) table: &'a SymbolTable,
    pub(super) signature: &'a MethodSignature,
    pub(super) names: NameGen,
    pub(super) vars: VarTable,
    code: Vec<IrInstruction>,
}

impl<'a> MethodLowering<'a> {
    fn new(tree: &'a Tree, table: &'a SymbolTable, signature: &'a MethodSignature) -> Self {
        let declared = signature
            .params
            .iter()
            .chain(&signature.locals)
            .chain(&table.fields)
            .map(|s| s.name.as_str())
            .chain(std::iter::once(THIS));

        let mut vars = VarTable::new();
        if !signature.is_static {
            vars.insert(THIS, IrType::Class(table.class_name.clone()));
        }
        for sym in signature.params.iter().chain(&signature.locals) {
            vars.insert(&sym.name, IrType::from(&sym.ty));
        }

        Self {
            tree,
            table,
            signature,
            names: NameGen::new(declared),
            vars,
            code: Vec::new(),
        }
    }

    fn lower(mut self, method: NodeId) -> Result<IrMethod> {
        let tree = self.tree;
        for &child in tree.children(method) {
            if tree.kind(child).is_statement() {
                self.statement(child)?;
            }
        }

        let return_type = IrType::from(&self.signature.return_type);
        if return_type.is_void() && !matches!(self.code.last(), Some(IrInstruction::Return(_))) {
            self.code.push(IrInstruction::Return(None));
        }

        let sig = self.signature;
        let method = IrMethod {
            name: sig.name.clone(),
            is_public: sig.is_public,
            is_static: sig.is_static,
            params: sig
                .params
                .iter()
                .map(|p| IrVar::new(&p.name, IrType::from(&p.ty)))
                .collect(),
            return_type,
            instructions: self.code,
            vars: self.vars,
            registers: None,
        };
        method.verify_vars()?;
        Ok(method)
    }

    /// Allocate a fresh temporary and give it a table entry
    pub(super) fn temp(&mut self, ty: IrType) -> String {
        let name = self.names.fresh("tmp");
        self.vars.insert(&name, ty);
        name
    }

    /// Lower an expression whose value is needed
    fn value(&mut self, node: NodeId, hint: Option<&IrType>) -> Result<Operand> {
        let lowered = self.expr(node, hint)?;
        self.code.extend(lowered.code);
        lowered
            .value
            .ok_or_else(|| Error::malformed(node.index(), "void value used as an operand"))
    }

    fn statement(&mut self, node: NodeId) -> Result<()> {
        let tree = self.tree;
        let table = self.table;
        match tree.kind(node) {
            NodeKind::Assign { target } => {
                let value = tree.child(node, 0)?;
                match table.resolve_in(self.signature, target) {
                    Some((SymbolKind::Field, field)) => {
                        let ty = IrType::from(&field.ty);
                        let value = self.value(value, Some(&ty))?;
                        self.code.push(IrInstruction::PutField {
                            object: Operand::var(THIS),
                            field: target.clone(),
                            ty,
                            value,
                        });
                    }
                    Some((_, sym)) => {
                        let ty = IrType::from(&sym.ty);
                        let src = self.value(value, Some(&ty))?;
                        self.code.push(IrInstruction::Move {
                            dst: target.clone(),
                            src,
                        });
                    }
                    None => return Err(unresolved(target, &self.signature.name)),
                }
            }

            NodeKind::ArrayAssign { target } => {
                let array = match table.resolve_in(self.signature, target) {
                    Some((SymbolKind::Field, field)) => {
                        let ty = IrType::from(&field.ty);
                        let dst = self.temp(ty.clone());
                        self.code.push(IrInstruction::GetField {
                            dst: dst.clone(),
                            object: Operand::var(THIS),
                            field: target.clone(),
                            ty,
                        });
                        Operand::Var(dst)
                    }
                    Some(_) => Operand::var(target),
                    None => return Err(unresolved(target, &self.signature.name)),
                };
                let index = self.value(tree.child(node, 0)?, Some(&IrType::Int))?;
                let value = self.value(tree.child(node, 1)?, Some(&IrType::Int))?;
                self.code.push(IrInstruction::ArrayStore {
                    array,
                    index,
                    value,
                });
            }

            NodeKind::Return => {
                let value = match tree.children(node).first() {
                    Some(&value) => {
                        let ty = IrType::from(&self.signature.return_type);
                        Some(self.value(value, Some(&ty))?)
                    }
                    None => None,
                };
                self.code.push(IrInstruction::Return(value));
            }

            NodeKind::If => {
                let n = self.names.next("if");
                let then_label = format!("then{}", n);
                let else_label = format!("else{}", n);
                let end_label = format!("endif{}", n);

                let cond = self.value(tree.child(node, 0)?, Some(&IrType::Boolean))?;
                self.code.push(IrInstruction::JumpIf {
                    cond,
                    target: then_label.clone(),
                });
                self.code.push(IrInstruction::Jump(else_label.clone()));

                self.code.push(IrInstruction::Label(then_label));
                self.statement(tree.child(node, 1)?)?;
                self.code.push(IrInstruction::Jump(end_label.clone()));

                self.code.push(IrInstruction::Label(else_label));
                if let Some(&otherwise) = tree.children(node).get(2) {
                    self.statement(otherwise)?;
                }
                self.code.push(IrInstruction::Label(end_label));
            }

            NodeKind::While => {
                let n = self.names.next("while");
                let cond_label = format!("whilecond{}", n);
                let body_label = format!("whilebody{}", n);
                let end_label = format!("endwhile{}", n);

                self.code.push(IrInstruction::Label(cond_label.clone()));
                let cond = self.value(tree.child(node, 0)?, Some(&IrType::Boolean))?;
                self.code.push(IrInstruction::JumpIf {
                    cond,
                    target: body_label.clone(),
                });
                self.code.push(IrInstruction::Jump(end_label.clone()));

                self.code.push(IrInstruction::Label(body_label));
                self.statement(tree.child(node, 1)?)?;
                self.code.push(IrInstruction::Jump(cond_label));
                self.code.push(IrInstruction::Label(end_label));
            }

            NodeKind::Block => {
                for &stmt in tree.children(node) {
                    self.statement(stmt)?;
                }
            }

            NodeKind::ExprStmt => {
                let lowered = self.expr(tree.child(node, 0)?, Some(&IrType::Void))?;
                self.code.extend(lowered.code);
            }

            other => {
                return Err(Error::malformed(
                    node.index(),
                    format!("expected a statement, found {}", other.label()),
                ))
            }
        }
        Ok(())
    }
}

pub(super) fn unresolved(name: &str, method: &str) -> Error {
    Error::UnresolvedSymbol {
        name: format!("{} (in method {})", name, method),
    }
}
