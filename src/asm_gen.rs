//! Assembly-like backend
//!
//! Lowers TAC into a small accumulator instruction set. Lowering is total:
//! every TAC instruction yields at least one line, in input order, and shapes
//! with no lowering are passed through as `; UNHANDLED` comments.
use std::fmt;

use crate::{
	parser::BinaryOperation,
	tac_gen::{Instruction, ValueRef},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
	Load,
	Store,
	Add,
	Sub,
	Mul,
	Div,
	CmpGt,
	CmpLt,
	CmpEq,
	CmpNe,
	Jmp,
	Jz,
	Jnz,
	Print,
}
impl fmt::Display for Opcode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Opcode::Load => "LOAD",
			Opcode::Store => "STORE",
			Opcode::Add => "ADD",
			Opcode::Sub => "SUB",
			Opcode::Mul => "MUL",
			Opcode::Div => "DIV",
			Opcode::CmpGt => "CMPGT",
			Opcode::CmpLt => "CMPLT",
			Opcode::CmpEq => "CMPEQ",
			Opcode::CmpNe => "CMPNE",
			Opcode::Jmp => "JMP",
			Opcode::Jz => "JZ",
			Opcode::Jnz => "JNZ",
			Opcode::Print => "PRINT",
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AsmLine {
	Op(Opcode, Option<String>),
	/// Rendered as `<label>:`
	Label(String),
	/// Rendered as `; <text>`
	Comment(String),
}
impl fmt::Display for AsmLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AsmLine::Op(opcode, Some(operand)) => write!(f, "{opcode} {operand}"),
			AsmLine::Op(opcode, None) => write!(f, "{opcode}"),
			AsmLine::Label(label) => write!(f, "{label}:"),
			AsmLine::Comment(text) => write!(f, "; {text}"),
		}
	}
}

fn op(opcode: Opcode, operand: impl fmt::Display) -> AsmLine {
	AsmLine::Op(opcode, Some(operand.to_string()))
}

pub fn lower(tac: &[Instruction]) -> Vec<AsmLine> {
	asm_gen(tac, false)
}

/// Lowers a rendered TAC listing, one instruction per line. Blank lines are
/// skipped.
pub fn lower_listing(listing: &str) -> Vec<AsmLine> {
	let tac: Vec<_> = listing.lines().filter_map(Instruction::parse_line).collect();
	lower(&tac)
}

/// With `annotate` set, each instruction's lines are preceded by a comment
/// holding the TAC they came from.
pub fn asm_gen(tac: &[Instruction], annotate: bool) -> Vec<AsmLine> {
	let asm: Vec<AsmLine> = tac
		.iter()
		.flat_map(|instruction| {
			let mut asm = Vec::new();
			if annotate {
				asm.push(AsmLine::Comment(instruction.to_string()));
			}
			asm.append(&mut lower_instruction(instruction));
			asm
		})
		.collect();
	log::info!("lowered {} TAC instructions into {} lines", tac.len(), asm.len());
	asm
}

fn lower_instruction(instruction: &Instruction) -> Vec<AsmLine> {
	if let Some(shape) = keyword_shaped(instruction) {
		return lower_instruction(&shape);
	}
	match instruction {
		Instruction::Label(label) | Instruction::LabelMarker(label) => {
			vec![AsmLine::Label(label.to_string())]
		}
		Instruction::Print(value) => vec![op(Opcode::Load, value), AsmLine::Op(Opcode::Print, None)],
		Instruction::IfFalse(cond, label) => vec![op(Opcode::Load, cond), op(Opcode::Jz, label)],
		Instruction::IfTrue(cond, label) => vec![op(Opcode::Load, cond), op(Opcode::Jnz, label)],
		Instruction::Goto(label) => vec![op(Opcode::Jmp, label)],
		Instruction::Assign { dest, value } => vec![op(Opcode::Load, value), op(Opcode::Store, dest)],
		Instruction::Binary {
			dest,
			lhs,
			op: operation,
			rhs,
		} => binary_gen(dest, lhs, *operation, rhs),
		Instruction::Unrecognized(line) => vec![AsmLine::Comment(format!("UNHANDLED {line}"))],
	}
}

/// Keywords are lowercase, so `PRINT`, `LABEL`, `IF` and `GOTO` are plain
/// identifiers. An assignment to one renders as a line that a listing
/// classifies by its keyword prefix, and it lowers by that shape here too.
fn keyword_shaped(instruction: &Instruction) -> Option<Instruction> {
	if !matches!(instruction, Instruction::Assign { .. } | Instruction::Binary { .. }) {
		return None;
	}
	match Instruction::parse_line(&instruction.to_string())? {
		Instruction::Assign { .. } | Instruction::Binary { .. } => None,
		shape => Some(shape),
	}
}

fn binary_gen(dest: &str, lhs: &ValueRef, operation: BinaryOperation, rhs: &ValueRef) -> Vec<AsmLine> {
	enum Operation {
		Arithmetic(Opcode),
		Conditional(Opcode),
		// No opcode; the whole expression is loaded as a single operand
		Opaque,
	}
	let kind = match operation {
		BinaryOperation::Add => Operation::Arithmetic(Opcode::Add),
		BinaryOperation::Sub => Operation::Arithmetic(Opcode::Sub),
		BinaryOperation::Mul => Operation::Arithmetic(Opcode::Mul),
		BinaryOperation::Div => Operation::Arithmetic(Opcode::Div),
		BinaryOperation::Greater => Operation::Conditional(Opcode::CmpGt),
		BinaryOperation::Less => Operation::Conditional(Opcode::CmpLt),
		BinaryOperation::Equal => Operation::Conditional(Opcode::CmpEq),
		BinaryOperation::NotEqual => Operation::Conditional(Opcode::CmpNe),
		BinaryOperation::GreaterEqual | BinaryOperation::LessEqual => Operation::Opaque,
	};
	match kind {
		Operation::Arithmetic(opcode) => vec![
			op(Opcode::Load, lhs),
			op(opcode, rhs),
			op(Opcode::Store, dest),
		],
		Operation::Conditional(opcode) => vec![
			op(Opcode::Load, lhs),
			op(Opcode::Load, rhs),
			AsmLine::Op(opcode, None),
			op(Opcode::Store, dest),
		],
		Operation::Opaque => vec![
			op(Opcode::Load, format!("{lhs} {operation} {rhs}")),
			op(Opcode::Store, dest),
		],
	}
}
