//! Scope string validation.

// self
use crate::_prelude::*;

/// Errors emitted when validating the configured scope string.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// The scope string holds no entries.
	#[error("Scope cannot be empty.")]
	Empty,
	/// The scope string is already percent-encoded.
	///
	/// Encoding happens once when the authorize URL is built; a pre-encoded value ends up
	/// double-encoded and providers reject the consent request.
	#[error("Scope must be a plain space-separated string, not percent-encoded: {scope}.")]
	PreEncoded {
		/// The offending scope string.
		scope: String,
	},
	/// The scope string contains control characters (tabs, newlines, ...).
	#[error("Scope contains control characters: {scope:?}.")]
	ContainsControl {
		/// The offending scope string.
		scope: String,
	},
}

/// Space-separated scope string requested during authorization.
///
/// Unlike a normalized scope set, the value is kept exactly as configured so the
/// authorize URL and the token request carry the same string the operator registered.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);
impl Scope {
	/// Validates and wraps a scope string.
	pub fn new(value: impl Into<String>) -> Result<Self, ScopeValidationError> {
		let value = value.into();

		validate(&value)?;

		Ok(Self(value))
	}

	/// Returns the scope string as configured.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Scope {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<Scope> for String {
	fn from(value: Scope) -> Self {
		value.0
	}
}
impl TryFrom<String> for Scope {
	type Error = ScopeValidationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for Scope {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Scope({})", self.0)
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate(value: &str) -> Result<(), ScopeValidationError> {
	if value.chars().any(char::is_control) {
		return Err(ScopeValidationError::ContainsControl { scope: value.to_owned() });
	}
	if value.contains('%') {
		return Err(ScopeValidationError::PreEncoded { scope: value.to_owned() });
	}
	if value.trim().is_empty() {
		return Err(ScopeValidationError::Empty);
	}

	Ok(())
}
