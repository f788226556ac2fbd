//! Resolver that matches request hosts against registered domain suffixes.

// self
use crate::{
	_prelude::*,
	credentials::{ClientCredentials, CredentialsProvider},
};

/// Maps normalized host patterns onto credential sets by domain suffix.
///
/// Registered hosts are stored reversed so right-to-left suffix matching reduces to a
/// string prefix test per entry. Entries are checked in registration order and the first
/// match wins; register more specific (longer) patterns before general ones when they
/// overlap.
#[derive(Clone, Debug, Default)]
pub struct DomainProvider {
	credentials: Vec<(String, ClientCredentials)>,
}
impl DomainProvider {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers one credential set under each of the provided host patterns.
	///
	/// Patterns are lower-cased and may be bare hosts (`example.com`), scheme-relative
	/// references (`//example.com`), or full URLs; a pattern starting with `/` looks like
	/// a path and fails with [`Error::InvalidUrl`].
	pub fn add<I, S>(&mut self, credentials: ClientCredentials, hosts: I) -> Result<&mut Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for host in hosts {
			let key = extract_host(host.as_ref())?;

			self.credentials.push((reverse(&key), credentials.clone()));
		}

		Ok(self)
	}
}
impl CredentialsProvider for DomainProvider {
	fn resolve(&self, uri: &Url) -> Result<&ClientCredentials> {
		let host = uri.host_str().unwrap_or_default();
		let reversed = reverse(host);

		for (suffix, credentials) in &self.credentials {
			if reversed.starts_with(suffix.as_str()) {
				return Ok(credentials);
			}
		}

		Err(Error::CredentialsNotFound { resource: host.into() })
	}
}

fn reverse(host: &str) -> String {
	host.chars().rev().collect()
}

fn extract_host(pattern: &str) -> Result<String> {
	let patched = patch_url(&pattern.to_ascii_lowercase())?;

	Url::parse(&patched)
		.ok()
		.and_then(|url| url.host_str().map(str::to_owned))
		.ok_or_else(|| Error::InvalidUrl { url: pattern.to_ascii_lowercase() })
}

/// Prepares a user-provided pattern so its host component can be parsed out.
fn patch_url(pattern: &str) -> Result<String> {
	if pattern.contains("://") {
		return Ok(pattern.into());
	}
	if let Some(rest) = pattern.strip_prefix("//") {
		return Ok(format!("http://{rest}"));
	}
	if pattern.starts_with('/') {
		return Err(Error::InvalidUrl { url: pattern.into() });
	}

	Ok(format!("http://{pattern}"))
}
