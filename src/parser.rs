//! Grammar:
/*
	<Program>		-> <Stmts>
	<Stmts>			-> <Stmts> <Stmt> | <Stmt>
	<Stmt>			-> int Ident = <Expression>;
					|  Ident = <Expression>;
					|  print(<Expression>);
					|  if (<Expression>) {<Stmts>}
					|  if (<Expression>) {<Stmts>} else {<Stmts>}
					|  while (<Expression>) {<Stmts>}
	<Expression>	-> <Expression> <BinaryOperation> <Expression>
					|  Const
					|  Ident
	<BinaryOperation>	-> *, /			left associative
						|  +, -			left associative
						|  <, <=, >, >=, ==, !=	right associative, loosest
*/
//! Every rule runs its action on the `CompilationContext` only after all of
//! its children are complete, so TAC comes out in reduction order: a block
//! body is always emitted before the branch that guards it.
use std::fmt;

use crate::{
	error::{Diagnostic, SyntaxError},
	lexer::{tokenize, Lexer, Reserved, Token, TokenKind},
	tac_gen::{CompilationContext, ValueRef},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperation {
	Add,
	Sub,
	Mul,
	Div,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	Equal,
	NotEqual,
}
impl BinaryOperation {
	fn from_token(token: &TokenKind) -> Option<BinaryOperation> {
		use TokenKind::*;
		match token {
			Plus => Some(Self::Add),
			Minus => Some(Self::Sub),
			Star => Some(Self::Mul),
			Slash => Some(Self::Div),
			Less => Some(Self::Less),
			LessEqual => Some(Self::LessEqual),
			Greater => Some(Self::Greater),
			GreaterEqual => Some(Self::GreaterEqual),
			EqualEqual => Some(Self::Equal),
			BangEqual => Some(Self::NotEqual),
			_ => None,
		}
	}
	/// Comparisons sit at 0 and are chained by `Parser::expression`
	fn precedence(self) -> u8 {
		match self {
			Self::Mul | Self::Div => 2,
			Self::Add | Self::Sub => 1,
			_ => 0,
		}
	}
}
impl fmt::Display for BinaryOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Add => "+",
			Self::Sub => "-",
			Self::Mul => "*",
			Self::Div => "/",
			Self::Less => "<",
			Self::LessEqual => "<=",
			Self::Greater => ">",
			Self::GreaterEqual => ">=",
			Self::Equal => "==",
			Self::NotEqual => "!=",
		})
	}
}

/// Parses `source`, driving `context` through every reduction.
///
/// Lexical and syntax errors are returned in encounter order; after each
/// syntax error the offending token is dropped and parsing resumes at the
/// next statement.
pub fn parse(source: &str, context: &mut CompilationContext) -> Vec<Diagnostic> {
	let mut parser = Parser {
		lexer: tokenize(source),
		lookahead: None,
		context,
		diagnostics: Vec::new(),
		depth: 0,
		consumed: 0,
	};
	parser.stmts(false);
	parser.diagnostics
}

/// Deepest block nesting accepted before a block is skipped as an error
pub const MAX_NESTING: usize = 64;

struct Parser<'src, 'ctx> {
	lexer: Lexer<'src>,
	lookahead: Option<Token>,
	context: &'ctx mut CompilationContext,
	diagnostics: Vec<Diagnostic>,
	/// Number of currently open `{` blocks
	depth: usize,
	/// Tokens handed to the grammar so far
	consumed: usize,
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
	fn report(&mut self, diagnostic: impl Into<Diagnostic>) {
		let diagnostic = diagnostic.into();
		log::warn!("{diagnostic}");
		self.diagnostics.push(diagnostic);
	}
	/// Next token for the grammar. Comments are dropped and lexical errors
	/// are recorded on the way.
	fn pull(&mut self) -> Option<Token> {
		loop {
			match self.lexer.next()? {
				Ok(Token {
					kind: TokenKind::Comment(_),
					..
				}) => continue,
				Ok(token) => return Some(token),
				Err(error) => self.report(error),
			}
		}
	}
	fn peek_token(&mut self) -> Option<&Token> {
		if self.lookahead.is_none() {
			self.lookahead = self.pull();
		}
		self.lookahead.as_ref()
	}
	fn peek(&mut self) -> Option<&TokenKind> {
		self.peek_token().map(|token| &token.kind)
	}
	fn bump(&mut self) -> Option<Token> {
		self.peek_token();
		let token = self.lookahead.take();
		if token.is_some() {
			self.consumed += 1;
		}
		token
	}
	fn next_if(&mut self, predicate: impl FnOnce(&TokenKind) -> bool) -> Option<Token> {
		if self.peek().is_some_and(predicate) {
			self.bump()
		} else {
			None
		}
	}
	#[inline]
	fn next_eq(&mut self, needle: &TokenKind) -> bool {
		self.next_if(|kind| kind == needle).is_some()
	}
	fn expect(&mut self, needle: TokenKind, expected: &'static str) -> Result<(), SyntaxError> {
		if self.next_eq(&needle) {
			Ok(())
		} else {
			Err(self.unexpected(expected))
		}
	}
	/// Error for the current lookahead, which is left in place
	fn unexpected(&mut self, expected: &'static str) -> SyntaxError {
		self.peek_token();
		let line = self.lexer.line();
		match &self.lookahead {
			Some(token) => SyntaxError::UnexpectedToken {
				found: token.kind.clone(),
				expected,
				line: token.line,
			},
			None => SyntaxError::UnexpectedEof { expected, line },
		}
	}
	/// Drops the offending token. If the statement was already under way the
	/// rest of it is skipped too. A `}` closing an open block is left for the
	/// block.
	fn recover(&mut self, mid_statement: bool) {
		let depth = self.depth;
		match self.peek() {
			None => return,
			Some(TokenKind::RightBrace) if depth > 0 => return,
			_ => {}
		}
		let dropped = self.bump();
		if !mid_statement || dropped.is_some_and(|token| token.kind == TokenKind::Semicolon) {
			return;
		}
		while let Some(kind) = self.peek() {
			match kind {
				TokenKind::Semicolon => {
					self.bump();
					return;
				}
				TokenKind::RightBrace if depth > 0 => return,
				TokenKind::Keyword(Reserved::Int | Reserved::If | Reserved::While | Reserved::Print) => {
					return
				}
				_ => {
					self.bump();
				}
			}
		}
	}

	/// `<Stmts>`, up to end of input or, inside a block, the closing brace
	fn stmts(&mut self, in_block: bool) {
		let mut attempted = 0;
		loop {
			match self.peek() {
				None => break,
				Some(TokenKind::RightBrace) if in_block => break,
				_ => {}
			}
			attempted += 1;
			let consumed = self.consumed;
			if let Err(error) = self.stmt() {
				// A block nested too deep was already skipped whole
				let skipped = matches!(error, SyntaxError::NestingTooDeep { .. });
				self.report(error);
				if !skipped {
					self.recover(self.consumed > consumed);
				}
			}
		}
		if attempted == 0 {
			let error = self.unexpected("statement");
			self.report(error);
		}
	}
	fn stmt(&mut self) -> Result<(), SyntaxError> {
		match self.peek() {
			Some(TokenKind::Keyword(Reserved::Int)) => self.declaration(),
			Some(TokenKind::Identifier(_)) => self.assignment(),
			Some(TokenKind::Keyword(Reserved::Print)) => self.print_statement(),
			Some(TokenKind::Keyword(Reserved::If)) => self.if_statement(),
			Some(TokenKind::Keyword(Reserved::While)) => self.while_statement(),
			_ => Err(self.unexpected("statement")),
		}
	}
	fn declaration(&mut self) -> Result<(), SyntaxError> {
		self.expect(TokenKind::Keyword(Reserved::Int), "'int'")?;
		let name = self.identifier()?;
		self.expect(TokenKind::Equal, "'='")?;
		let value = self.expression()?;
		self.expect(TokenKind::Semicolon, "';'")?;
		self.context.declare(&name, value);
		Ok(())
	}
	fn assignment(&mut self) -> Result<(), SyntaxError> {
		let name = self.identifier()?;
		self.expect(TokenKind::Equal, "'='")?;
		let value = self.expression()?;
		self.expect(TokenKind::Semicolon, "';'")?;
		self.context.assign(&name, value);
		Ok(())
	}
	fn print_statement(&mut self) -> Result<(), SyntaxError> {
		self.expect(TokenKind::Keyword(Reserved::Print), "'print'")?;
		self.expect(TokenKind::LeftParenthesis, "'('")?;
		let value = self.expression()?;
		self.expect(TokenKind::RightParenthesis, "')'")?;
		self.expect(TokenKind::Semicolon, "';'")?;
		self.context.print(value);
		Ok(())
	}
	fn if_statement(&mut self) -> Result<(), SyntaxError> {
		self.expect(TokenKind::Keyword(Reserved::If), "'if'")?;
		let cond = self.condition()?;
		self.block()?;
		if self.next_eq(&TokenKind::Keyword(Reserved::Else)) {
			self.block()?;
			self.context.if_else(cond);
		} else {
			self.context.if_then(cond);
		}
		Ok(())
	}
	fn while_statement(&mut self) -> Result<(), SyntaxError> {
		self.expect(TokenKind::Keyword(Reserved::While), "'while'")?;
		let cond = self.condition()?;
		self.block()?;
		self.context.while_loop(cond);
		Ok(())
	}
	/// `(<Expression>)`
	fn condition(&mut self) -> Result<ValueRef, SyntaxError> {
		self.expect(TokenKind::LeftParenthesis, "'('")?;
		let cond = self.expression()?;
		self.expect(TokenKind::RightParenthesis, "')'")?;
		Ok(cond)
	}
	/// `{<Stmts>}`
	fn block(&mut self) -> Result<(), SyntaxError> {
		self.expect(TokenKind::LeftBrace, "'{'")?;
		if self.depth == MAX_NESTING {
			let line = self.lexer.line();
			self.skip_block();
			return Err(SyntaxError::NestingTooDeep {
				limit: MAX_NESTING,
				line,
			});
		}
		self.depth += 1;
		self.stmts(true);
		self.depth -= 1;
		self.expect(TokenKind::RightBrace, "'}'")
	}
	/// Drops tokens through the `}` matching an already consumed `{`
	fn skip_block(&mut self) {
		let mut open = 1usize;
		while open > 0 {
			match self.bump().map(|token| token.kind) {
				Some(TokenKind::LeftBrace) => open += 1,
				Some(TokenKind::RightBrace) => open -= 1,
				Some(_) => {}
				None => break,
			}
		}
	}
	fn identifier(&mut self) -> Result<String, SyntaxError> {
		match self.next_if(|kind| matches!(kind, TokenKind::Identifier(_))) {
			Some(Token {
				kind: TokenKind::Identifier(name),
				..
			}) => Ok(name),
			_ => Err(self.unexpected("identifier")),
		}
	}
	/// A chain of comparisons over arithmetic operands. The operands are
	/// reduced as they complete, then the comparisons from the right.
	fn expression(&mut self) -> Result<ValueRef, SyntaxError> {
		let mut chain = Vec::new();
		let mut r_value = self.binary_expression(1)?;
		while let Some(operation) = self.peek().and_then(BinaryOperation::from_token) {
			self.bump();
			let operand = self.binary_expression(1)?;
			chain.push((std::mem::replace(&mut r_value, operand), operation));
		}
		while let Some((l_value, operation)) = chain.pop() {
			r_value = self.context.binary(l_value, operation, r_value);
		}
		Ok(r_value)
	}
	/// Precedence climbing over the left associative arithmetic operators.
	/// Each operator is reduced as soon as its right operand is complete.
	fn binary_expression(&mut self, min_precedence: u8) -> Result<ValueRef, SyntaxError> {
		let mut l_value = self.direct_value()?;
		while let Some(operation) = self.peek().and_then(BinaryOperation::from_token) {
			let precedence = operation.precedence();
			if precedence < min_precedence {
				break;
			}
			self.bump();
			let r_value = self.binary_expression(precedence + 1)?;
			l_value = self.context.binary(l_value, operation, r_value);
		}
		Ok(l_value)
	}
	fn direct_value(&mut self) -> Result<ValueRef, SyntaxError> {
		match self.next_if(|kind| matches!(kind, TokenKind::Identifier(_) | TokenKind::Number(_))) {
			Some(Token {
				kind: TokenKind::Identifier(name),
				..
			}) => Ok(self.context.identifier(&name)),
			Some(Token {
				kind: TokenKind::Number(value),
				..
			}) => Ok(ValueRef::Literal(value)),
			_ => Err(self.unexpected("expression")),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{config::Config, error::LexicalError};

	fn compile_tac(source: &str) -> (Vec<String>, Vec<Diagnostic>) {
		let mut context = CompilationContext::default();
		let diagnostics = parse(source, &mut context);
		let tac = context
			.instructions()
			.iter()
			.map(ToString::to_string)
			.collect();
		(tac, diagnostics)
	}

	#[test]
	fn declarations() {
		let (tac, diagnostics) = compile_tac("int a = 2; int b = 3; int c = a + b;");
		assert_eq!(vec!["a = 2", "b = 3", "t1 = a + b", "c = t1"], tac);
		assert!(diagnostics.is_empty());
	}

	#[test]
	fn precedence() {
		let (tac, _) = compile_tac("x = a + b * c - d;");
		assert_eq!(
			vec!["t1 = b * c", "t2 = a + t1", "t3 = t2 - d", "x = t3"],
			tac
		);
		let (tac, _) = compile_tac("x = a * b + c * d;");
		assert_eq!(
			vec!["t1 = a * b", "t2 = c * d", "t3 = t1 + t2", "x = t3"],
			tac
		);
		let (tac, _) = compile_tac("x = a - b - c;");
		assert_eq!(vec!["t1 = a - b", "t2 = t1 - c", "x = t2"], tac);
	}

	#[test]
	fn comparisons_bind_loosest() {
		let (tac, _) = compile_tac("print(a + 1 >= b * 2);");
		assert_eq!(
			vec!["t1 = a + 1", "t2 = b * 2", "t3 = t1 >= t2", "PRINT t3"],
			tac
		);
		let (tac, _) = compile_tac("x = a < b == c;");
		assert_eq!(vec!["t1 = b == c", "t2 = a < t1", "x = t2"], tac);
	}

	#[test]
	fn if_body_is_emitted_before_branch() {
		let (tac, diagnostics) = compile_tac("int x = 1; if (x > 0) { print(x); }");
		assert_eq!(
			vec!["x = 1", "t1 = x > 0", "PRINT x", "IF t1 GOTO L1", "L1:"],
			tac
		);
		assert!(diagnostics.is_empty());
	}

	#[test]
	fn if_else() {
		let (tac, _) = compile_tac(
			r"
			if (a == b) {
				x = 1;
			} else {
				x = 2;
			}
			",
		);
		assert_eq!(
			vec![
				"t1 = a == b",
				"x = 1",
				"x = 2",
				"IF_FALSE t1 GOTO L1",
				"GOTO L2",
				"L1:",
				"L2:",
			],
			tac
		);
	}

	#[test]
	fn nested_while() {
		let (tac, diagnostics) = compile_tac(
			r"
			int i = 0;
			while (i < 3) {
				if (i != 1) {
					print(i);
				}
				i = i + 1;
			}
			",
		);
		assert_eq!(
			vec![
				"i = 0",
				"t1 = i < 3",
				"t2 = i != 1",
				"PRINT i",
				"IF t2 GOTO L1",
				"L1:",
				"t3 = i + 1",
				"i = t3",
				"LABEL L2",
				"IF_FALSE t1 GOTO L3",
				"GOTO L2",
				"L3:",
			],
			tac
		);
		assert!(diagnostics.is_empty());
	}

	#[test]
	fn propagated_bindings() {
		let mut context = CompilationContext::new(Config::default().propagate_bindings(true));
		let diagnostics = parse("int x = 5; y = x + z; print(y);", &mut context);
		assert!(diagnostics.is_empty());
		let tac: Vec<_> = context
			.instructions()
			.iter()
			.map(ToString::to_string)
			.collect();
		assert_eq!(vec!["x = 5", "t1 = 5 + z", "y = t1", "PRINT t1"], tac);
	}

	#[test]
	fn missing_identifier_recovers() {
		let (tac, diagnostics) = compile_tac("int = 5;\nprint(7);");
		assert_eq!(
			vec![Diagnostic::Syntax(SyntaxError::UnexpectedToken {
				found: TokenKind::Equal,
				expected: "identifier",
				line: 1,
			})],
			diagnostics
		);
		assert_eq!(vec!["PRINT 7"], tac);
	}

	#[test]
	fn broken_statement_inside_block() {
		let (tac, diagnostics) = compile_tac("while (x) { y = ; z = 1; } print(z);");
		assert_eq!(
			vec![Diagnostic::Syntax(SyntaxError::UnexpectedToken {
				found: TokenKind::Semicolon,
				expected: "expression",
				line: 1,
			})],
			diagnostics
		);
		assert_eq!(
			vec![
				"z = 1",
				"LABEL L1",
				"IF_FALSE x GOTO L2",
				"GOTO L1",
				"L2:",
				"PRINT z"
			],
			tac
		);

		let (tac, diagnostics) = compile_tac("if (x) { y = }");
		assert_eq!(1, diagnostics.len());
		assert_eq!(vec!["IF x GOTO L1", "L1:"], tac);
	}

	#[test]
	fn empty_block_is_an_error() {
		let (tac, diagnostics) = compile_tac("if (x) {} print(1);");
		assert_eq!(
			vec![Diagnostic::Syntax(SyntaxError::UnexpectedToken {
				found: TokenKind::RightBrace,
				expected: "statement",
				line: 1,
			})],
			diagnostics
		);
		assert_eq!(vec!["IF x GOTO L1", "L1:", "PRINT 1"], tac);
	}

	#[test]
	fn unexpected_eof() {
		let (tac, diagnostics) = compile_tac("int x = 5");
		assert_eq!(
			vec![Diagnostic::Syntax(SyntaxError::UnexpectedEof {
				expected: "';'",
				line: 1,
			})],
			diagnostics
		);
		assert!(tac.is_empty());

		let (_, diagnostics) = compile_tac("// nothing but a comment\n");
		assert_eq!(
			vec![Diagnostic::Syntax(SyntaxError::UnexpectedEof {
				expected: "statement",
				line: 2,
			})],
			diagnostics
		);
	}

	#[test]
	fn lexical_errors_are_collected() {
		let (tac, diagnostics) = compile_tac("int x = 1 # ;\nprint(x);");
		assert_eq!(
			vec![Diagnostic::Lexical(LexicalError::IllegalCharacter {
				character: '#',
				line: 1,
			})],
			diagnostics
		);
		assert_eq!(vec!["x = 1", "PRINT x"], tac);
	}

	#[test]
	fn long_comparison_chain() {
		let source = format!("x = a{};", " < a".repeat(10_000));
		let (tac, diagnostics) = compile_tac(&source);
		assert!(diagnostics.is_empty());
		assert_eq!(10_001, tac.len());
		assert_eq!("t1 = a < a", tac[0]);
		assert_eq!("t2 = a < t1", tac[1]);
		assert_eq!("t10000 = a < t9999", tac[9_999]);
		assert_eq!("x = t10000", tac[10_000]);
	}

	#[test]
	fn deeply_nested_blocks() {
		let levels = 200;
		let source = format!(
			"{}print(x);{} print(y);",
			"while (x) { ".repeat(levels),
			"}".repeat(levels)
		);
		let (tac, diagnostics) = compile_tac(&source);
		assert_eq!(
			vec![Diagnostic::Syntax(SyntaxError::NestingTooDeep {
				limit: MAX_NESTING,
				line: 1,
			})],
			diagnostics
		);
		assert!(!tac.iter().any(|line| line == "PRINT x"));
		assert_eq!(MAX_NESTING * 4 + 1, tac.len());
		assert_eq!(["LABEL L1", "IF_FALSE x GOTO L2", "GOTO L1", "L2:"], tac[..4]);
		assert_eq!("PRINT y", tac[MAX_NESTING * 4]);

		let (_, diagnostics) = compile_tac(&format!(
			"{}print(x);{}",
			"while (x) { ".repeat(MAX_NESTING),
			"}".repeat(MAX_NESTING)
		));
		assert!(diagnostics.is_empty());
	}

	#[test]
	fn stray_closing_brace() {
		let (tac, diagnostics) = compile_tac("} x = 1;");
		assert_eq!(1, diagnostics.len());
		assert_eq!(vec!["x = 1"], tac);
	}
}
