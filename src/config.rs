/// Options for a single compilation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
	/// Substitute an identifier's current binding when it is read, instead of
	/// referring to it by name. Unbound identifiers still resolve to their name.
	pub propagate_bindings: bool,
	/// Precede the assembly of each TAC instruction with a `; <tac>` comment
	pub annotate_asm: bool,
}

impl Config {
	pub fn propagate_bindings(mut self, enabled: bool) -> Self {
		self.propagate_bindings = enabled;
		self
	}
	pub fn annotate_asm(mut self, enabled: bool) -> Self {
		self.annotate_asm = enabled;
		self
	}
}
