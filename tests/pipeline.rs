// End-to-end tests for the compilation pipeline

use tacc::{
	asm_gen, compile,
	error::{CompileError, Diagnostic, SyntaxError},
	lexer::{tokenize, TokenKind},
	report, Config, Instruction,
};

fn tac_lines(compilation: &tacc::Compilation) -> Vec<String> {
	compilation.tac.iter().map(ToString::to_string).collect()
}

fn asm_lines(compilation: &tacc::Compilation) -> Vec<String> {
	compilation.asm.iter().map(ToString::to_string).collect()
}

#[test]
fn declaration_and_print() {
	let compilation = compile("int x = 5; print(x);", Config::default()).unwrap();
	assert_eq!(vec!["x = 5", "PRINT x"], tac_lines(&compilation));
	assert_eq!(
		vec!["LOAD 5", "STORE x", "LOAD x", "PRINT"],
		asm_lines(&compilation)
	);
	assert_eq!("x = 5\n", report::symbol_dump(&compilation.symbol_table));
	assert!(compilation.diagnostics.is_empty());
}

#[test]
fn addition() {
	let compilation =
		compile("int a = 2; int b = 3; int c = a + b;", Config::default()).unwrap();
	assert_eq!(
		vec!["a = 2", "b = 3", "t1 = a + b", "c = t1"],
		tac_lines(&compilation)
	);
	let asm = asm_lines(&compilation);
	let add = asm.iter().position(|line| line == "ADD b").unwrap();
	assert_eq!(
		["LOAD a", "ADD b", "STORE t1", "LOAD t1", "STORE c"],
		asm[add - 1..add + 4]
	);
}

#[test]
fn if_body_precedes_branch() {
	let compilation = compile("int x = 1; if (x > 0) { print(x); }", Config::default()).unwrap();
	let tac = tac_lines(&compilation);
	let print = tac.iter().position(|line| line == "PRINT x").unwrap();
	let branch = tac.iter().position(|line| line == "IF t1 GOTO L1").unwrap();
	assert!(print < branch);
	assert_eq!("L1:", tac[branch + 1]);
}

#[test]
fn syntax_error_recovery() {
	let compilation = compile("int = 5;\nint y = 2;\nprint(y);", Config::default()).unwrap();
	assert_eq!(
		vec![Diagnostic::Syntax(SyntaxError::UnexpectedToken {
			found: TokenKind::Equal,
			expected: "identifier",
			line: 1,
		})],
		compilation.diagnostics
	);
	assert_eq!(vec!["y = 2", "PRINT y"], tac_lines(&compilation));
	assert_eq!(
		"Syntax error at '=' on line 1, expected identifier",
		compilation.diagnostics[0].to_string()
	);
}

#[test]
fn empty_source() {
	assert_eq!(
		CompileError::EmptySource,
		compile(" \n\t", Config::default()).unwrap_err()
	);
}

#[test]
fn straight_line_assignment_count() {
	// 4 statements and 3 binary operators
	let source = "int a = 1; int b = a * 2 + 3; a = b - a; print(a);";
	let compilation = compile(source, Config::default()).unwrap();
	let assignments = compilation
		.tac
		.iter()
		.filter(|instruction| {
			matches!(
				instruction,
				Instruction::Assign { .. } | Instruction::Binary { .. } | Instruction::Print(_)
			)
		})
		.count();
	assert_eq!(4 + 3, assignments);
	assert_eq!(compilation.tac.len(), assignments);
}

#[test]
fn runs_do_not_share_state() {
	let source = "int i = 0; while (i < 2) { i = i + 1; }";
	let first = compile(source, Config::default()).unwrap();
	let second = compile(source, Config::default()).unwrap();
	assert_eq!(tac_lines(&first), tac_lines(&second));
	assert_eq!(
		vec![
			"i = 0",
			"t1 = i < 2",
			"t2 = i + 1",
			"i = t2",
			"LABEL L1",
			"IF_FALSE t1 GOTO L2",
			"GOTO L1",
			"L2:",
		],
		tac_lines(&first)
	);
}

#[test]
fn tokenizing_is_repeatable() {
	let source = "/* header */ int n = 3;\nwhile (n != 0) { n = n - 1; } $";
	assert_eq!(
		tokenize(source).collect::<Vec<_>>(),
		tokenize(source).collect::<Vec<_>>()
	);
}

#[test]
fn lowering_covers_every_line_in_order() {
	let source = r"
		int n = 4;
		int f = 1;
		while (n > 1) {
			f = f * n;
			n = n - 1;
		}
		if (f == 24) { print(f); } else { print(0); }
	";
	let compilation = compile(source, Config::default().annotate_asm(true)).unwrap();
	let annotations: Vec<String> = compilation
		.asm
		.iter()
		.filter_map(|line| match line {
			tacc::AsmLine::Comment(text) => Some(text.clone()),
			_ => None,
		})
		.collect();
	assert_eq!(tac_lines(&compilation), annotations);

	let listing = report::tac_dump(&compilation.tac);
	assert_eq!(
		asm_gen::lower(&compilation.tac),
		asm_gen::lower_listing(&listing)
	);
}

#[test]
fn propagated_bindings() {
	let compilation = compile(
		"int x = 5; print(x); x = x + 1; print(x);",
		Config::default().propagate_bindings(true),
	)
	.unwrap();
	assert_eq!(
		vec!["x = 5", "PRINT 5", "t1 = 5 + 1", "x = t1", "PRINT t1"],
		tac_lines(&compilation)
	);
}
