//! Expression lowering
//!
//! Every expression lowers to a [`Lowered`]: the operand holding its value
//! and the instructions that compute it. Children are lowered first, left
//! to right, and the instruction for the node itself comes last, so the
//! emitted order is the source evaluation order.
//!
//! `hint` is the type the surrounding context expects. It only decides
//! anything for calls and fields whose definition is not visible here
//! (imports and inherited members). With no hint such a value is `int`;
//! a call lowered as a statement gets the `void` hint and no result.

use super::generator::{unresolved, MethodLowering};
use super::instruction::{IrInstruction, Operand};
use super::program::{INITIALIZER, THIS};
use super::types::IrType;
use crate::ast::{BinaryOp, NodeId, NodeKind, UnaryOp};
use crate::semantic::{type_of, unwrap_parens, ExternalTypeAssumption, Scope};
use crate::symbols::{MethodSignature, SymbolKind};
use crate::{Error, Result};

/// A lowered expression
#[derive(Debug)]
pub(super) struct Lowered {
    /// Result operand, `None` for void calls
    pub(super) value: Option<Operand>,
    /// Static type of the result
    pub(super) ty: IrType,
    /// Instructions computing the result
    pub(super) code: Vec<IrInstruction>,
}

impl Lowered {
    fn operand(value: Operand, ty: IrType) -> Self {
        Self {
            value: Some(value),
            ty,
            code: Vec::new(),
        }
    }
}

/// How a call reaches its method
enum CallTarget {
    Static(String),
    Virtual(Operand, String),
}

impl<'a> MethodLowering<'a> {
    /// Lower the expression at `node`
    pub(super) fn expr(&mut self, node: NodeId, hint: Option<&IrType>) -> Result<Lowered> {
        let tree = self.tree;
        let mut code = Vec::new();
        let lowered = match tree.kind(node) {
            NodeKind::IntLiteral { value } => Lowered::operand(Operand::Const(*value), IrType::Int),
            NodeKind::BoolLiteral { value } => {
                Lowered::operand(Operand::bool(*value), IrType::Boolean)
            }
            NodeKind::This => Lowered::operand(Operand::var(THIS), self.class_type()),
            NodeKind::VarRef { name } => return self.variable(name),
            NodeKind::Paren => return self.expr(tree.child(node, 0)?, hint),

            NodeKind::Binary { op } => {
                let op = *op;
                let (lhs_node, rhs_node) = (tree.child(node, 0)?, tree.child(node, 1)?);
                let operand_hint = if op.is_logical() {
                    Some(IrType::Boolean)
                } else if op.is_equality() {
                    None
                } else {
                    Some(IrType::Int)
                };
                // equality operands take the other side's type
                let lhs_hint = match &operand_hint {
                    Some(ty) => ty.clone(),
                    None => self.static_type(rhs_node).unwrap_or(IrType::Int),
                };
                let (lhs, lhs_ty) = self.operand(lhs_node, Some(&lhs_hint), &mut code)?;
                let rhs_hint = operand_hint.unwrap_or(lhs_ty);
                let (rhs, _) = self.operand(rhs_node, Some(&rhs_hint), &mut code)?;
                let ty = binary_type(op);
                let dst = self.temp(ty.clone());
                code.push(IrInstruction::Binary {
                    dst: dst.clone(),
                    op,
                    lhs,
                    rhs,
                });
                Lowered::operand(Operand::Var(dst), ty)
            }

            NodeKind::Unary { op } => {
                let ty = match op {
                    UnaryOp::Not => IrType::Boolean,
                    UnaryOp::Neg => IrType::Int,
                };
                let (src, _) = self.operand(tree.child(node, 0)?, Some(&ty), &mut code)?;
                let dst = self.temp(ty.clone());
                code.push(IrInstruction::Unary {
                    dst: dst.clone(),
                    op: *op,
                    src,
                });
                Lowered::operand(Operand::Var(dst), ty)
            }

            NodeKind::MethodCall { method } => return self.call(node, method, hint),

            NodeKind::FieldAccess { field } => {
                let object = tree.child(node, 0)?;
                let object_hint = self.receiver_hint(object);
                let (object, object_ty) = self.operand(object, Some(&object_hint), &mut code)?;
                let ty = match self.table.field(field) {
                    Some(f) if object_ty == self.class_type() => IrType::from(&f.ty),
                    _ => hint
                        .filter(|h| !h.is_void())
                        .cloned()
                        .unwrap_or(IrType::Int),
                };
                let dst = self.temp(ty.clone());
                code.push(IrInstruction::GetField {
                    dst: dst.clone(),
                    object,
                    field: field.clone(),
                    ty: ty.clone(),
                });
                Lowered::operand(Operand::Var(dst), ty)
            }

            NodeKind::ArrayAccess => {
                let int_array = IrType::int_array();
                let (array, array_ty) =
                    self.operand(tree.child(node, 0)?, Some(&int_array), &mut code)?;
                let (index, _) = self.operand(tree.child(node, 1)?, Some(&IrType::Int), &mut code)?;
                let ty = match array_ty {
                    IrType::Array(elem) => *elem,
                    _ => IrType::Int,
                };
                let dst = self.temp(ty.clone());
                code.push(IrInstruction::ArrayLoad {
                    dst: dst.clone(),
                    array,
                    index,
                });
                Lowered::operand(Operand::Var(dst), ty)
            }

            NodeKind::ArrayLength => {
                let int_array = IrType::int_array();
                let (array, _) =
                    self.operand(tree.child(node, 0)?, Some(&int_array), &mut code)?;
                let dst = self.temp(IrType::Int);
                code.push(IrInstruction::ArrayLength {
                    dst: dst.clone(),
                    array,
                });
                Lowered::operand(Operand::Var(dst), IrType::Int)
            }

            NodeKind::NewArray => {
                let (size, _) = self.operand(tree.child(node, 0)?, Some(&IrType::Int), &mut code)?;
                let dst = self.temp(IrType::int_array());
                code.push(IrInstruction::NewArray {
                    dst: dst.clone(),
                    size,
                });
                Lowered::operand(Operand::Var(dst), IrType::int_array())
            }

            NodeKind::ArrayLiteral => {
                let mut elements = Vec::new();
                for &element in tree.children(node) {
                    elements.push(self.operand(element, Some(&IrType::Int), &mut code)?.0);
                }
                let dst = self.int_array_of(elements, &mut code);
                Lowered::operand(Operand::Var(dst), IrType::int_array())
            }

            NodeKind::NewObject { class } => {
                let ty = IrType::Class(class.clone());
                let dst = self.temp(ty.clone());
                code.push(IrInstruction::New {
                    dst: dst.clone(),
                    class: class.clone(),
                });
                code.push(IrInstruction::InvokeSpecial {
                    object: Operand::var(&dst),
                    class: class.clone(),
                    method: INITIALIZER.to_string(),
                });
                Lowered::operand(Operand::Var(dst), ty)
            }

            other => {
                return Err(Error::malformed(
                    node.index(),
                    format!("expected an expression, found {}", other.label()),
                ))
            }
        };
        Ok(Lowered { code, ..lowered })
    }

    /// Lower a sub-expression into `code` and return its operand
    fn operand(
        &mut self,
        node: NodeId,
        hint: Option<&IrType>,
        code: &mut Vec<IrInstruction>,
    ) -> Result<(Operand, IrType)> {
        let lowered = self.expr(node, hint)?;
        code.extend(lowered.code);
        match lowered.value {
            Some(value) => Ok((value, lowered.ty)),
            None => Err(Error::malformed(
                node.index(),
                "void value used as an operand",
            )),
        }
    }

    fn class_type(&self) -> IrType {
        IrType::Class(self.table.class_name.clone())
    }

    fn variable(&mut self, name: &str) -> Result<Lowered> {
        let table = self.table;
        match table.resolve_in(self.signature, name) {
            Some((SymbolKind::Field, field)) => {
                let ty = IrType::from(&field.ty);
                let dst = self.temp(ty.clone());
                let load = IrInstruction::GetField {
                    dst: dst.clone(),
                    object: Operand::var(THIS),
                    field: name.to_string(),
                    ty: ty.clone(),
                };
                Ok(Lowered {
                    value: Some(Operand::Var(dst)),
                    ty,
                    code: vec![load],
                })
            }
            Some((_, sym)) => Ok(Lowered::operand(Operand::var(name), IrType::from(&sym.ty))),
            None if name == THIS => Ok(Lowered::operand(Operand::var(THIS), self.class_type())),
            None => Err(unresolved(name, &self.signature.name)),
        }
    }

    /// Static type of `node` as analysis sees it, if it is known locally
    fn static_type(&self, node: NodeId) -> Option<IrType> {
        let scope = Scope {
            table: self.table,
            method: Some(self.signature),
            policy: ExternalTypeAssumption::default(),
        };
        type_of(self.tree, node, &scope)
            .ok()?
            .known()
            .map(IrType::from)
    }

    /// Type assumed for a receiver whose own type is not visible here: the
    /// imported class at the root of the receiver chain, else the
    /// superclass, else `int`
    fn receiver_hint(&self, receiver: NodeId) -> IrType {
        let tree = self.tree;
        let mut root = unwrap_parens(tree, receiver);
        while let NodeKind::MethodCall { .. } | NodeKind::FieldAccess { .. } = tree.kind(root) {
            match tree.children(root).first() {
                Some(&inner) => root = unwrap_parens(tree, inner),
                None => break,
            }
        }
        match (self.static_receiver(root), &self.table.superclass) {
            (Some(class), _) => IrType::Class(class),
            (None, Some(superclass)) => IrType::Class(superclass.clone()),
            (None, None) => IrType::Int,
        }
    }

    /// Import name used directly as a call receiver (`io.println(...)`)
    fn static_receiver(&self, receiver: NodeId) -> Option<String> {
        let receiver = unwrap_parens(self.tree, receiver);
        match self.tree.kind(receiver) {
            NodeKind::VarRef { name }
                if name != THIS
                    && self.table.resolve_in(self.signature, name).is_none()
                    && self.table.is_imported(name) =>
            {
                Some(name.clone())
            }
            _ => None,
        }
    }

    fn call(&mut self, node: NodeId, method: &str, hint: Option<&IrType>) -> Result<Lowered> {
        let tree = self.tree;
        let receiver = tree.child(node, 0)?;
        let args = tree.children(node).get(1..).unwrap_or(&[]);
        let mut code = Vec::new();

        let target = match self.static_receiver(receiver) {
            Some(class) => CallTarget::Static(class),
            None => {
                let hint = self.receiver_hint(receiver);
                let (object, ty) = self.operand(receiver, Some(&hint), &mut code)?;
                let class = match ty {
                    IrType::Class(name) => name,
                    other => other.to_string(),
                };
                CallTarget::Virtual(object, class)
            }
        };
        let table = self.table;
        let signature = match &target {
            CallTarget::Virtual(_, class) if *class == table.class_name => {
                table.signature(method).ok()
            }
            _ => None,
        };

        let args = self.arguments(args, signature, &mut code)?;
        let ret = match signature {
            Some(sig) => IrType::from(&sig.return_type),
            None => hint.cloned().unwrap_or(IrType::Int),
        };
        let dst = if ret.is_void() {
            None
        } else {
            Some(self.temp(ret.clone()))
        };

        code.push(match target {
            CallTarget::Static(class) => IrInstruction::InvokeStatic {
                dst: dst.clone(),
                class,
                method: method.to_string(),
                args,
                ret: ret.clone(),
            },
            CallTarget::Virtual(object, class) => IrInstruction::InvokeVirtual {
                dst: dst.clone(),
                object,
                class,
                method: method.to_string(),
                args,
                ret: ret.clone(),
            },
        });
        Ok(Lowered {
            value: dst.map(Operand::Var),
            ty: ret,
            code,
        })
    }

    /// Lower call arguments. Trailing arguments of a variadic parameter are
    /// packed into a fresh `int[]` unless a single array is passed.
    fn arguments(
        &mut self,
        args: &[NodeId],
        signature: Option<&MethodSignature>,
        code: &mut Vec<IrInstruction>,
    ) -> Result<Vec<Operand>> {
        let Some(sig) = signature else {
            let mut out = Vec::with_capacity(args.len());
            for &arg in args {
                out.push(self.operand(arg, Some(&IrType::Int), code)?.0);
            }
            return Ok(out);
        };

        let fixed = if sig.has_varargs() {
            sig.params.len() - 1
        } else {
            sig.params.len()
        };
        let mut out = Vec::with_capacity(args.len());
        for (i, &arg) in args.iter().enumerate().take(fixed) {
            let hint = sig.params.get(i).map(|p| IrType::from(&p.ty));
            out.push(self.operand(arg, hint.as_ref(), code)?.0);
        }
        if !sig.has_varargs() {
            for &arg in args.iter().skip(fixed) {
                out.push(self.operand(arg, Some(&IrType::Int), code)?.0);
            }
            return Ok(out);
        }

        let mut rest = Vec::new();
        for &arg in args.iter().skip(fixed) {
            rest.push(self.operand(arg, Some(&IrType::Int), code)?);
        }
        if let [(array, ty)] = rest.as_slice() {
            if *ty == IrType::int_array() {
                out.push(array.clone());
                return Ok(out);
            }
        }
        let elements = rest.into_iter().map(|(value, _)| value).collect();
        let packed = self.int_array_of(elements, code);
        out.push(Operand::Var(packed));
        Ok(out)
    }

    /// `new int[n]` followed by one store per element
    fn int_array_of(&mut self, elements: Vec<Operand>, code: &mut Vec<IrInstruction>) -> String {
        let dst = self.temp(IrType::int_array());
        code.push(IrInstruction::NewArray {
            dst: dst.clone(),
            size: Operand::Const(elements.len() as i32),
        });
        for (i, value) in elements.into_iter().enumerate() {
            code.push(IrInstruction::ArrayStore {
                array: Operand::var(&dst),
                index: Operand::Const(i as i32),
                value,
            });
        }
        dst
    }
}

fn binary_type(op: BinaryOp) -> IrType {
    if op.is_arithmetic() {
        IrType::Int
    } else {
        IrType::Boolean
    }
}
