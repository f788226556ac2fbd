//! Resolver that walks an ordered list of delegate resolvers.

// self
use crate::{
	_prelude::*,
	credentials::{self, ClientCredentials, CredentialsProvider},
};

/// Tries each delegate resolver in turn until one yields credentials.
///
/// A delegate failing with [`Error::CredentialsNotFound`] is skipped; any other failure
/// propagates immediately. When every delegate has been exhausted the chain fails with
/// `CredentialsNotFound` naming the full target (scheme, host, port, path).
#[derive(Default)]
pub struct ChainProvider {
	providers: Vec<Box<dyn CredentialsProvider>>,
}
impl ChainProvider {
	/// Creates a chain over the provided resolvers, queried in order.
	pub fn new(providers: Vec<Box<dyn CredentialsProvider>>) -> Self {
		Self { providers }
	}

	/// Appends a resolver to the end of the chain.
	pub fn add(&mut self, provider: Box<dyn CredentialsProvider>) -> &mut Self {
		self.providers.push(provider);

		self
	}
}
impl CredentialsProvider for ChainProvider {
	fn resolve(&self, uri: &Url) -> Result<&ClientCredentials> {
		for provider in &self.providers {
			match provider.resolve(uri) {
				Err(Error::CredentialsNotFound { .. }) => continue,
				outcome => return outcome,
			}
		}

		Err(Error::CredentialsNotFound { resource: credentials::display_target(uri) })
	}
}
impl Debug for ChainProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ChainProvider").field("providers", &self.providers.len()).finish()
	}
}
