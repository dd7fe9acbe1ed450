use std::{fs, io, path::PathBuf, process::ExitCode};

use clap::Parser;
use tacc::{report, Config};

#[derive(Parser, Debug)]
#[command(version, about = "Compile a tiny imperative language to TAC and assembly-like code")]
struct Args {
	/// Source file, read from stdin when omitted
	input: Option<PathBuf>,
	/// Substitute an identifier's current binding when it is read
	#[arg(long)]
	propagate_bindings: bool,
	/// Precede each lowered instruction with its TAC as a comment
	#[arg(long)]
	annotate: bool,
}

fn main() -> ExitCode {
	env_logger::init();
	let args = Args::parse();
	let source = match &args.input {
		Some(path) => fs::read_to_string(path),
		None => io::read_to_string(io::stdin()),
	};
	let source = match source {
		Ok(source) => source,
		Err(error) => {
			eprintln!("failed to read input: {error}");
			return ExitCode::FAILURE;
		}
	};
	let config = Config::default()
		.propagate_bindings(args.propagate_bindings)
		.annotate_asm(args.annotate);
	let compilation = match tacc::compile(&source, config) {
		Ok(compilation) => compilation,
		Err(error) => {
			eprintln!("{error}");
			return ExitCode::FAILURE;
		}
	};

	println!("--- LEXICAL ANALYSIS ---");
	print!("{}", report::token_report(&source));
	for diagnostic in &compilation.diagnostics {
		eprintln!("{diagnostic}");
	}
	println!("\n--- SYMBOL TABLE ---");
	print!("{}", report::symbol_dump(&compilation.symbol_table));
	println!("\n--- THREE ADDRESS CODE ---");
	print!("{}", report::tac_dump(&compilation.tac));
	println!("\n--- ASSEMBLY-LIKE CODE ---");
	print!("{}", report::asm_dump(&compilation.asm));

	if compilation.diagnostics.is_empty() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	}
}
