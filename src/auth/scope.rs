//! Scope modeling helpers used across the broker.

// std
use std::slice::Iter;
// self
use crate::_prelude::*;

/// Ordered list of OAuth scopes as granted by the authorization server.
///
/// The server's grant order is preserved (RFC 6749 puts no meaning on the order, but the
/// raw response is reproducible this way) and membership tests ignore ASCII case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeList(Vec<String>);
impl ScopeList {
	/// Creates a scope list from any iterator, preserving order.
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(scopes.into_iter().map(Into::into).collect())
	}

	/// Splits a space-delimited scope string, discarding empty entries.
	pub fn from_delimited(raw: &str) -> Self {
		Self(raw.split(' ').filter(|scope| !scope.is_empty()).map(str::to_owned).collect())
	}

	/// Number of granted scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes were granted.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Tests whether the list contains the scope, ignoring ASCII case.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|candidate| candidate.eq_ignore_ascii_case(scope))
	}

	/// Iterator over the scopes in grant order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|scope| scope.as_str())
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(" "))
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|scope| scope.as_str())
	}
}
impl<'a> IntoIterator for &'a ScopeList {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.0.iter() }
	}
}
