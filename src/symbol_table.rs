//! Flat, unscoped symbol table
//!
//! A single mapping from identifier to its current `ValueRef`. Writes
//! overwrite in place, so iteration keeps first-insertion order.
use crate::tac_gen::ValueRef;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SymbolTable {
	entries: Vec<(String, ValueRef)>,
}
impl SymbolTable {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn bind(&mut self, name: &str, value: ValueRef) {
		match self.entries.iter_mut().find(|(i, _)| i == name) {
			Some((_, slot)) => *slot = value,
			None => self.entries.push((name.to_string(), value)),
		}
	}
	pub fn lookup(&self, name: &str) -> Option<&ValueRef> {
		self.entries
			.iter()
			.find(|(i, _)| i == name)
			.map(|(_, value)| value)
	}
	/// The current binding of `name`, or `name` itself when it was never bound
	pub fn resolve(&self, name: &str) -> ValueRef {
		self.lookup(name)
			.cloned()
			.unwrap_or_else(|| ValueRef::Name(name.to_string()))
	}
	pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueRef)> {
		self.entries.iter().map(|(name, value)| (name.as_str(), value))
	}
	pub fn len(&self) -> usize {
		self.entries.len()
	}
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
