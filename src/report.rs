//! Text artifacts for the driver: the categorized token report and the
//! symbol, TAC and assembly listings.
use std::fmt;

use crate::{
	asm_gen::AsmLine,
	error::LexicalError,
	lexer::{tokenize, Category},
	symbol_table::SymbolTable,
	tac_gen::Instruction,
};

/// Lexemes of a source text grouped by `Category`, each group in encounter
/// order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenReport {
	categories: Vec<(Category, Vec<String>)>,
	pub errors: Vec<LexicalError>,
}

impl TokenReport {
	pub fn values(&self, category: Category) -> &[String] {
		self.categories
			.iter()
			.find(|(i, _)| *i == category)
			.map(|(_, values)| values.as_slice())
			.unwrap_or_default()
	}
}

impl fmt::Display for TokenReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (category, values) in &self.categories {
			writeln!(f, "{category} ({}): {}", values.len(), values.join(", "))?;
		}
		Ok(())
	}
}

pub fn token_report(source: &str) -> TokenReport {
	let mut categories: Vec<(Category, Vec<String>)> =
		Category::ALL.iter().map(|&i| (i, Vec::new())).collect();
	let mut errors = Vec::new();
	for token in tokenize(source) {
		match token {
			Ok(token) => {
				let category = token.kind.category();
				if let Some((_, values)) = categories.iter_mut().find(|(i, _)| *i == category) {
					values.push(token.kind.to_string());
				}
			}
			Err(error) => errors.push(error),
		}
	}
	TokenReport { categories, errors }
}

fn listing<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
	items.into_iter().map(|item| format!("{item}\n")).collect()
}

/// `name = value` per binding, in insertion order
pub fn symbol_dump(symbol_table: &SymbolTable) -> String {
	listing(
		symbol_table
			.iter()
			.map(|(name, value)| format!("{name} = {value}")),
	)
}

pub fn tac_dump(tac: &[Instruction]) -> String {
	listing(tac)
}

pub fn asm_dump(asm: &[AsmLine]) -> String {
	listing(asm)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::tac_gen::ValueRef;

	#[test]
	fn categorized_tokens() {
		let report = token_report("int x = 10; // set\nif (x >= 2) { print(x, 3); } @");
		assert_eq!(
			"Keyword (3): int, if, print\n\
			Identifier (3): x, x, x\n\
			Constant (3): 10, 2, 3\n\
			Operator (2): =, >=\n\
			Punctuation (9): ;, (, ), {, (, ,, ), ;, }\n\
			Comment (1): // set\n",
			report.to_string()
		);
		assert_eq!(
			vec![LexicalError::IllegalCharacter {
				character: '@',
				line: 2
			}],
			report.errors
		);
		assert_eq!(&["10", "2", "3"], report.values(Category::Constant));
	}

	#[test]
	fn empty_categories() {
		assert_eq!(
			"Keyword (0): \n\
			Identifier (0): \n\
			Constant (0): \n\
			Operator (0): \n\
			Punctuation (0): \n\
			Comment (0): \n",
			token_report("").to_string()
		);
	}

	#[test]
	fn dumps() {
		let mut table = SymbolTable::new();
		table.bind("x", ValueRef::Literal(5));
		table.bind("y", ValueRef::Name("t1".into()));
		assert_eq!("x = 5\ny = t1\n", symbol_dump(&table));
		assert_eq!(
			"PRINT x\nL1:\n",
			tac_dump(&[
				Instruction::Print(ValueRef::Name("x".into())),
				Instruction::Label(crate::tac_gen::Label("L1".into())),
			])
		);
		assert_eq!("", asm_dump(&[]));
	}
}
