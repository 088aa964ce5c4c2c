//! Debug utilities for inspecting lowered IR

use super::ir::{IrClass, IrInstruction, IrMethod, Operand};
use std::fmt::Write;

/// Print an IR class to stdout
pub fn dump_ir(class: &IrClass) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                    IR DUMP");
    println!("═══════════════════════════════════════════════════════════");
    print!("{}", format_class(class));
    println!("═══════════════════════════════════════════════════════════\n");
}

/// Format a single IR instruction
pub fn format_instr(instr: &IrInstruction) -> String {
    match instr {
        IrInstruction::Move { dst, src } => format!("{} = {}", dst, src),
        IrInstruction::Binary { dst, op, lhs, rhs } => {
            format!("{} = {} {} {}", dst, lhs, op, rhs)
        }
        IrInstruction::Unary { dst, op, src } => format!("{} = {}{}", dst, op, src),

        IrInstruction::GetField {
            dst,
            object,
            field,
            ty,
        } => format!("{} = getfield {}.{} : {}", dst, object, field, ty),
        IrInstruction::PutField {
            object,
            field,
            ty,
            value,
        } => format!("putfield {}.{} : {} = {}", object, field, ty, value),
        IrInstruction::New { dst, class } => format!("{} = new {}", dst, class),

        IrInstruction::InvokeSpecial {
            object,
            class,
            method,
        } => format!("invokespecial {}.{}:{}()", object, class, method),
        IrInstruction::InvokeStatic {
            dst,
            class,
            method,
            args,
            ret,
        } => format!(
            "{}invokestatic {}.{}({}) : {}",
            assign_prefix(dst),
            class,
            method,
            join(args),
            ret
        ),
        IrInstruction::InvokeVirtual {
            dst,
            object,
            class,
            method,
            args,
            ret,
        } => format!(
            "{}invokevirtual {}:{}.{}({}) : {}",
            assign_prefix(dst),
            object,
            class,
            method,
            join(args),
            ret
        ),

        IrInstruction::NewArray { dst, size } => format!("{} = new int[{}]", dst, size),
        IrInstruction::ArrayLength { dst, array } => format!("{} = {}.length", dst, array),
        IrInstruction::ArrayLoad { dst, array, index } => {
            format!("{} = {}[{}]", dst, array, index)
        }
        IrInstruction::ArrayStore {
            array,
            index,
            value,
        } => format!("{}[{}] = {}", array, index, value),

        IrInstruction::Return(Some(value)) => format!("return {}", value),
        IrInstruction::Return(None) => "return".to_string(),
        IrInstruction::Label(name) => format!("{}:", name),
        IrInstruction::Jump(target) => format!("goto {}", target),
        IrInstruction::JumpIf { cond, target } => format!("if {} goto {}", cond, target),
    }
}

fn assign_prefix(dst: &Option<String>) -> String {
    dst.as_ref().map(|d| format!("{} = ", d)).unwrap_or_default()
}

fn join(args: &[Operand]) -> String {
    args.iter()
        .map(Operand::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a method: signature, variables with their registers, then one
/// instruction per line
pub fn format_method(method: &IrMethod) -> String {
    let mut out = String::new();
    let params = method
        .params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        ".method {}{}{}({}) : {}",
        if method.is_public { "public " } else { "" },
        if method.is_static { "static " } else { "" },
        method.name,
        params,
        method.return_type
    );
    if let Some(assignment) = &method.registers {
        let _ = writeln!(out, "  .registers {}", assignment.register_count);
    }
    for (name, info) in method.vars.iter() {
        let reg = method.register_of(name).unwrap_or(info.virtual_reg);
        let _ = writeln!(out, "  ; r{} {} : {}", reg, name, info.ty);
    }
    for (i, instr) in method.instructions.iter().enumerate() {
        match instr {
            IrInstruction::Label(_) => {
                let _ = writeln!(out, "  {}", format_instr(instr));
            }
            _ => {
                let _ = writeln!(out, "  {:04}:   {}", i, format_instr(instr));
            }
        }
    }
    out.push_str(".end method\n");
    out
}

/// Format a whole class
pub fn format_class(class: &IrClass) -> String {
    let mut out = String::new();
    let _ = writeln!(out, ".class {}", class.name);
    let _ = writeln!(out, ".super {}", class.superclass);
    for import in &class.imports {
        let _ = writeln!(out, ".import {}", import);
    }
    for field in &class.fields {
        let _ = writeln!(out, ".field {} : {}", field.name, field.ty);
    }
    for method in &class.methods {
        out.push('\n');
        out.push_str(&format_method(method));
    }
    out
}
