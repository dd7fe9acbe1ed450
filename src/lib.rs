//! Crate root: wires together the compilation pipeline.
//!
//! - `lexer` scans source text into a lazy token stream.
//! - `parser` drives a `tac_gen::CompilationContext` through the grammar,
//!   emitting three address code as each rule is reduced.
//! - `asm_gen` lowers the finished TAC into assembly-like instructions.
//! - `report` renders the artifacts handed back to the driver.

pub mod asm_gen;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod symbol_table;
pub mod tac_gen;

pub use asm_gen::AsmLine;
pub use config::Config;
pub use error::{CompileError, Diagnostic};
pub use symbol_table::SymbolTable;
pub use tac_gen::{CompilationContext, Instruction, ValueRef};

/// Everything one run produces. The artifacts are partial when
/// `diagnostics` is not empty.
#[derive(Clone, Debug)]
pub struct Compilation {
	pub symbol_table: SymbolTable,
	pub tac: Vec<Instruction>,
	pub asm: Vec<AsmLine>,
	pub diagnostics: Vec<Diagnostic>,
}

/// Compiles `source` with a fresh `CompilationContext`, so runs never share
/// state.
pub fn compile(source: &str, config: Config) -> Result<Compilation, CompileError> {
	if source.trim().is_empty() {
		return Err(CompileError::EmptySource);
	}
	let mut context = CompilationContext::new(config);
	let diagnostics = parser::parse(source, &mut context);
	let (symbol_table, tac) = context.into_parts();
	log::info!(
		"parsed {} symbols into {} TAC instructions with {} diagnostics",
		symbol_table.len(),
		tac.len(),
		diagnostics.len()
	);
	let asm = asm_gen::asm_gen(&tac, config.annotate_asm);
	Ok(Compilation {
		symbol_table,
		tac,
		asm,
		diagnostics,
	})
}
