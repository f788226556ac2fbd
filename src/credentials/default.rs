//! Resolver that serves one fixed credential set for every request.

// self
use crate::{
	_prelude::*,
	credentials::{ClientCredentials, CredentialsProvider},
};

/// Serves a single credential set regardless of the target URI.
#[derive(Clone, Debug)]
pub struct DefaultProvider(ClientCredentials);
impl DefaultProvider {
	/// Wraps the credential set to serve.
	pub fn new(credentials: ClientCredentials) -> Self {
		Self(credentials)
	}
}
impl CredentialsProvider for DefaultProvider {
	fn resolve(&self, _: &Url) -> Result<&ClientCredentials> {
		Ok(&self.0)
	}
}
