//! Error taxonomy
//!
//! Lexical and syntax errors never stop the pipeline. They are collected as
//! `Diagnostic`s next to whatever artifacts could still be produced. The only
//! hard failure is being handed no source at all.
use thiserror::Error;

use crate::lexer::TokenKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalError {
	#[error("Illegal character '{character}' at line {line}")]
	IllegalCharacter { character: char, line: usize },
	#[error("Integer literal {literal} out of range at line {line}")]
	LiteralOutOfRange { literal: String, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
	#[error("Syntax error at '{found}' on line {line}, expected {expected}")]
	UnexpectedToken {
		found: TokenKind,
		expected: &'static str,
		line: usize,
	},
	#[error("Syntax error at EOF on line {line}, expected {expected}")]
	UnexpectedEof { expected: &'static str, line: usize },
	#[error("Syntax error on line {line}, blocks nested deeper than {limit} levels")]
	NestingTooDeep { limit: usize, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
	#[error(transparent)]
	Lexical(#[from] LexicalError),
	#[error(transparent)]
	Syntax(#[from] SyntaxError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
	#[error("No input provided. Please provide source code via a file or stdin.")]
	EmptySource,
}
