//! Lexical Analyzer
//!
//! Call the `lexer::tokenize` function with the input source code as `&str`.
//! The returned `Lexer` is a lazy iterator of `Result<Token, LexicalError>`;
//! it is `Clone`, so a scan can be restarted from any point.
use std::{fmt, iter::Peekable, str::CharIndices};

use crate::error::LexicalError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
	Keyword(Reserved),

	Identifier(String),
	Number(i64),
	/// Full comment text including the `//` or `/* */` delimiters
	Comment(String),

	// Brackets
	LeftParenthesis,
	RightParenthesis,
	LeftBrace,
	RightBrace,
	Semicolon,
	Comma,

	// Operators
	// Arithmetic
	Plus,
	Minus,
	Star,
	Slash,
	// Comparison
	EqualEqual,
	BangEqual,
	Greater,
	Less,
	GreaterEqual,
	LessEqual,
	// Assignment
	Equal,
}

/// Lexical categories used by the token report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
	Keyword,
	Identifier,
	Constant,
	Operator,
	Punctuation,
	Comment,
}
impl Category {
	pub const ALL: [Category; 6] = [
		Category::Keyword,
		Category::Identifier,
		Category::Constant,
		Category::Operator,
		Category::Punctuation,
		Category::Comment,
	];
}
impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

impl TokenKind {
	pub fn category(&self) -> Category {
		use TokenKind::*;
		match self {
			Keyword(_) => Category::Keyword,
			Identifier(_) => Category::Identifier,
			Number(_) => Category::Constant,
			Comment(_) => Category::Comment,
			Plus | Minus | Star | Slash | EqualEqual | BangEqual | Greater | Less
			| GreaterEqual | LessEqual | Equal => Category::Operator,
			LeftParenthesis | RightParenthesis | LeftBrace | RightBrace | Semicolon | Comma => {
				Category::Punctuation
			}
		}
	}
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use TokenKind::*;
		let symbol = match self {
			Keyword(reserved) => return write!(f, "{reserved}"),
			Identifier(name) => return f.write_str(name),
			Number(value) => return write!(f, "{value}"),
			Comment(text) => return f.write_str(text),
			LeftParenthesis => "(",
			RightParenthesis => ")",
			LeftBrace => "{",
			RightBrace => "}",
			Semicolon => ";",
			Comma => ",",
			Plus => "+",
			Minus => "-",
			Star => "*",
			Slash => "/",
			EqualEqual => "==",
			BangEqual => "!=",
			Greater => ">",
			Less => "<",
			GreaterEqual => ">=",
			LessEqual => "<=",
			Equal => "=",
		};
		f.write_str(symbol)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reserved {
	Int,
	If,
	Else,
	While,
	Print,
}
impl fmt::Display for Reserved {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Reserved::Int => "int",
			Reserved::If => "if",
			Reserved::Else => "else",
			Reserved::While => "while",
			Reserved::Print => "print",
		})
	}
}

/// A `TokenKind` and the line it starts on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	pub line: usize,
}
impl Token {
	pub fn new(kind: TokenKind, line: usize) -> Self {
		Self { kind, line }
	}
}

#[derive(Clone, Debug)]
pub struct Lexer<'src> {
	source: &'src str,
	stream_iter: Peekable<CharIndices<'src>>,
	line_number: usize,
}

pub fn tokenize(input_stream: &str) -> Lexer<'_> {
	Lexer {
		source: input_stream,
		stream_iter: input_stream.char_indices().peekable(),
		line_number: 1,
	}
}

impl<'src> Lexer<'src> {
	/// Line the scanner is currently on
	pub fn line(&self) -> usize {
		self.line_number
	}
	fn offset(&mut self) -> usize {
		self.stream_iter
			.peek()
			.map_or(self.source.len(), |&(offset, _)| offset)
	}
	fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> usize {
		while self.stream_iter.next_if(|&(_, c)| predicate(c)).is_some() {}
		self.offset()
	}
	fn next_is(&mut self, needle: char) -> bool {
		self.stream_iter.next_if(|&(_, c)| c == needle).is_some()
	}
	/// Consumes a `/* ... */` comment starting at `start` if it is terminated.
	/// Returns the end offset of the comment.
	fn block_comment(&mut self, start: usize) -> Option<usize> {
		if !self.stream_iter.peek().is_some_and(|&(_, c)| c == '*') {
			return None;
		}
		let end = start + 2 + self.source.get(start + 2..)?.find("*/")? + 2;
		while let Some((_, c)) = self.stream_iter.next_if(|&(offset, _)| offset < end) {
			if c == '\n' {
				self.line_number += 1;
			}
		}
		Some(end)
	}
}

impl<'src> Iterator for Lexer<'src> {
	type Item = Result<Token, LexicalError>;

	fn next(&mut self) -> Option<Self::Item> {
		let is_identifier_symbol = |char: char| char.is_ascii_alphanumeric() || char == '_';
		let source = self.source;
		loop {
			let (start, current) = self.stream_iter.next()?;
			let line = self.line_number;
			if current == '\n' {
				self.line_number += 1;
			}
			if current.is_whitespace() {
				continue;
			}
			// Handle line comments
			if current == '/' && self.next_is('/') {
				let end = self.consume_while(|x| x != '\n');
				let text = source[start..end].to_string();
				return Some(Ok(Token::new(TokenKind::Comment(text), line)));
			}
			if current == '/' {
				if let Some(end) = self.block_comment(start) {
					let text = source[start..end].to_string();
					return Some(Ok(Token::new(TokenKind::Comment(text), line)));
				}
			}
			let matched_token = match current {
				char if char.is_ascii_digit() => {
					let end = self.consume_while(|i| i.is_ascii_digit());
					let literal = &source[start..end];
					match literal.parse::<i64>() {
						Ok(value) => TokenKind::Number(value),
						Err(_) => {
							return Some(Err(LexicalError::LiteralOutOfRange {
								literal: literal.to_string(),
								line,
							}))
						}
					}
				}
				char if char.is_ascii_alphabetic() || char == '_' => {
					let end = self.consume_while(is_identifier_symbol);
					let ident = &source[start..end];
					keywords(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()))
				}
				'+' => TokenKind::Plus,
				'-' => TokenKind::Minus,
				'*' => TokenKind::Star,
				'/' => TokenKind::Slash,
				'=' => {
					if self.next_is('=') {
						TokenKind::EqualEqual
					} else {
						TokenKind::Equal
					}
				}
				'!' if self.next_is('=') => TokenKind::BangEqual,
				'<' => {
					if self.next_is('=') {
						TokenKind::LessEqual
					} else {
						TokenKind::Less
					}
				}
				'>' => {
					if self.next_is('=') {
						TokenKind::GreaterEqual
					} else {
						TokenKind::Greater
					}
				}
				',' => TokenKind::Comma,
				';' => TokenKind::Semicolon,
				'(' => TokenKind::LeftParenthesis,
				')' => TokenKind::RightParenthesis,
				'{' => TokenKind::LeftBrace,
				'}' => TokenKind::RightBrace,
				character => {
					return Some(Err(LexicalError::IllegalCharacter { character, line }));
				}
			};
			log::trace!("line {line}: {matched_token:?}");
			return Some(Ok(Token::new(matched_token, line)));
		}
	}
}

fn keywords(id: &str) -> Option<TokenKind> {
	match id {
		"int" => Some(TokenKind::Keyword(Reserved::Int)),
		"if" => Some(TokenKind::Keyword(Reserved::If)),
		"else" => Some(TokenKind::Keyword(Reserved::Else)),
		"while" => Some(TokenKind::Keyword(Reserved::While)),
		"print" => Some(TokenKind::Keyword(Reserved::Print)),
		_ => None,
	}
}
