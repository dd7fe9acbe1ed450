//! Three Address Code Generation
//!
//! The parser calls into a `CompilationContext` each time it reduces a
//! grammar rule. The context owns every piece of state a run mutates: the
//! symbol table, the ordered instruction log and the temporary and label
//! counters. A fresh context means a fresh run.
use std::fmt;

use crate::{config::Config, parser::BinaryOperation, symbol_table::SymbolTable};

/// Result of evaluating an expression. Nothing is ever folded, so this is
/// either the literal itself or the name holding the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRef {
	Literal(i64),
	/// A source identifier or a generated temporary
	Name(String),
}
impl ValueRef {
	/// Reads a rendered operand back. Decimal digits that render back to the
	/// same text are a literal, anything else (`007` included) is kept
	/// verbatim as a name.
	pub fn parse(text: &str) -> Self {
		if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
			if let Ok(value) = text.parse::<i64>() {
				if value.to_string() == text {
					return Self::Literal(value);
				}
			}
		}
		Self::Name(text.to_string())
	}
}
impl fmt::Display for ValueRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(value) => write!(f, "{value}"),
			Self::Name(name) => f.write_str(name),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(pub String);
impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
	/// `dest = value`
	Assign { dest: String, value: ValueRef },
	/// `dest = lhs <op> rhs`
	Binary {
		dest: String,
		lhs: ValueRef,
		op: BinaryOperation,
		rhs: ValueRef,
	},
	/// `L1:`
	Label(Label),
	/// `LABEL L1`, the loop head marker
	LabelMarker(Label),
	/// `GOTO L1`
	Goto(Label),
	/// `IF cond GOTO L1`
	IfTrue(ValueRef, Label),
	/// `IF_FALSE cond GOTO L1`
	IfFalse(ValueRef, Label),
	/// `PRINT value`
	Print(ValueRef),
	/// A textual TAC line matching none of the shapes above
	Unrecognized(String),
}

impl fmt::Display for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Assign { dest, value } => write!(f, "{dest} = {value}"),
			Self::Binary { dest, lhs, op, rhs } => write!(f, "{dest} = {lhs} {op} {rhs}"),
			Self::Label(label) => write!(f, "{label}:"),
			Self::LabelMarker(label) => write!(f, "LABEL {label}"),
			Self::Goto(label) => write!(f, "GOTO {label}"),
			Self::IfTrue(cond, label) => write!(f, "IF {cond} GOTO {label}"),
			Self::IfFalse(cond, label) => write!(f, "IF_FALSE {cond} GOTO {label}"),
			Self::Print(value) => write!(f, "PRINT {value}"),
			Self::Unrecognized(line) => f.write_str(line),
		}
	}
}

/// Padded infix operators recognized inside a textual assignment, in the
/// order they are tried
const TEXT_OPERATORS: [(&str, BinaryOperation); 8] = [
	(" + ", BinaryOperation::Add),
	(" - ", BinaryOperation::Sub),
	(" * ", BinaryOperation::Mul),
	(" / ", BinaryOperation::Div),
	(" > ", BinaryOperation::Greater),
	(" < ", BinaryOperation::Less),
	(" == ", BinaryOperation::Equal),
	(" != ", BinaryOperation::NotEqual),
];

impl Instruction {
	/// Classifies one line of a rendered TAC listing by its shape. Returns
	/// `None` for blank lines.
	pub fn parse_line(line: &str) -> Option<Self> {
		let line = line.trim();
		if line.is_empty() {
			return None;
		}
		let unrecognized = || Self::Unrecognized(line.to_string());
		let instruction = if let Some(label) = line.strip_suffix(':') {
			Self::Label(Label(label.to_string()))
		} else if let Some(label) = line.strip_prefix("LABEL ") {
			Self::LabelMarker(Label(label.trim().to_string()))
		} else if let Some(value) = line.strip_prefix("PRINT ") {
			Self::Print(ValueRef::parse(value.trim()))
		} else if let Some(rest) = line.strip_prefix("IF_FALSE ") {
			conditional_jump(rest).map_or_else(unrecognized, |(cond, label)| Self::IfFalse(cond, label))
		} else if let Some(rest) = line.strip_prefix("IF ") {
			conditional_jump(rest).map_or_else(unrecognized, |(cond, label)| Self::IfTrue(cond, label))
		} else if let Some(rest) = line.strip_prefix("GOTO ") {
			rest.split_whitespace()
				.next()
				.map_or_else(unrecognized, |label| Self::Goto(Label(label.to_string())))
		} else if let Some((dest, expr)) = line.split_once('=') {
			let dest = dest.trim().to_string();
			let expr = expr.trim();
			TEXT_OPERATORS
				.iter()
				.find_map(|(pattern, op)| {
					expr.split_once(*pattern).map(|(lhs, rhs)| Self::Binary {
						dest: dest.clone(),
						lhs: ValueRef::parse(lhs.trim()),
						op: *op,
						rhs: ValueRef::parse(rhs.trim()),
					})
				})
				.unwrap_or_else(|| Self::Assign {
					dest,
					value: ValueRef::parse(expr),
				})
		} else {
			unrecognized()
		};
		Some(instruction)
	}
}

/// Splits `<cond...> GOTO <label>`
fn conditional_jump(rest: &str) -> Option<(ValueRef, Label)> {
	let parts: Vec<&str> = rest.split_whitespace().collect();
	match parts.as_slice() {
		[cond @ .., "GOTO", label] if !cond.is_empty() => Some((
			ValueRef::parse(&cond.join(" ")),
			Label(label.to_string()),
		)),
		_ => None,
	}
}

/// Monotonic name source, `t1, t2, ...` or `L1, L2, ...`
#[derive(Debug, Clone)]
struct NameGen {
	prefix: &'static str,
	count: usize,
}
impl NameGen {
	fn new(prefix: &'static str) -> Self {
		Self { prefix, count: 0 }
	}
	fn next(&mut self) -> String {
		self.count += 1;
		format!("{}{}", self.prefix, self.count)
	}
}

#[derive(Debug, Clone)]
pub struct CompilationContext {
	config: Config,
	symbol_table: SymbolTable,
	instructions: Vec<Instruction>,
	temporaries: NameGen,
	labels: NameGen,
}

impl Default for CompilationContext {
	fn default() -> Self {
		Self::new(Config::default())
	}
}

impl CompilationContext {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			symbol_table: SymbolTable::new(),
			instructions: Vec::new(),
			temporaries: NameGen::new("t"),
			labels: NameGen::new("L"),
		}
	}
	pub fn symbol_table(&self) -> &SymbolTable {
		&self.symbol_table
	}
	pub fn instructions(&self) -> &[Instruction] {
		&self.instructions
	}
	pub fn into_parts(self) -> (SymbolTable, Vec<Instruction>) {
		(self.symbol_table, self.instructions)
	}

	pub fn new_temp(&mut self) -> String {
		self.temporaries.next()
	}
	pub fn new_label(&mut self) -> Label {
		Label(self.labels.next())
	}
	fn emit(&mut self, instruction: Instruction) {
		log::trace!("emit {instruction}");
		self.instructions.push(instruction);
	}

	/// `expression := ID`
	pub fn identifier(&self, name: &str) -> ValueRef {
		if self.config.propagate_bindings {
			self.symbol_table.resolve(name)
		} else {
			ValueRef::Name(name.to_string())
		}
	}
	/// `expression := expression OP expression`, always through a new temporary
	pub fn binary(&mut self, lhs: ValueRef, op: BinaryOperation, rhs: ValueRef) -> ValueRef {
		let dest = self.new_temp();
		self.emit(Instruction::Binary {
			dest: dest.clone(),
			lhs,
			op,
			rhs,
		});
		ValueRef::Name(dest)
	}

	pub fn declare(&mut self, name: &str, value: ValueRef) {
		log::debug!("Declared {name} = {value}");
		self.bind(name, value);
	}
	pub fn assign(&mut self, name: &str, value: ValueRef) {
		log::debug!("Assigned {name} = {value}");
		self.bind(name, value);
	}
	fn bind(&mut self, name: &str, value: ValueRef) {
		self.symbol_table.bind(name, value.clone());
		self.emit(Instruction::Assign {
			dest: name.to_string(),
			value,
		});
	}
	pub fn print(&mut self, value: ValueRef) {
		log::debug!("Print statement: {value}");
		self.emit(Instruction::Print(value));
	}

	// The control flow actions run after their bodies were already emitted,
	// so the branch and its labels always trail the body.
	pub fn if_then(&mut self, cond: ValueRef) {
		log::debug!("If condition: {cond}");
		let label = self.new_label();
		self.emit(Instruction::IfTrue(cond, label.clone()));
		self.emit(Instruction::Label(label));
	}
	pub fn if_else(&mut self, cond: ValueRef) {
		log::debug!("If-Else condition: {cond}");
		let else_label = self.new_label();
		let end_label = self.new_label();
		self.emit(Instruction::IfFalse(cond, else_label.clone()));
		self.emit(Instruction::Goto(end_label.clone()));
		self.emit(Instruction::Label(else_label));
		self.emit(Instruction::Label(end_label));
	}
	pub fn while_loop(&mut self, cond: ValueRef) {
		log::debug!("While loop condition: {cond}");
		let start_label = self.new_label();
		let end_label = self.new_label();
		self.emit(Instruction::LabelMarker(start_label.clone()));
		self.emit(Instruction::IfFalse(cond, end_label.clone()));
		self.emit(Instruction::Goto(start_label));
		self.emit(Instruction::Label(end_label));
	}
}
