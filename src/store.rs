//! Storage contract and the built-in in-memory cache for issued tokens.

pub mod memory;

pub use memory::MemoryStore;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Token, credentials::ClientCredentials};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Cache backend contract for issued tokens.
///
/// The cache is advisory: the broker re-checks expiry on every read and treats any
/// [`StoreError`] as a miss, so implementations may fail without affecting correctness.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the token cached under `key`, if any.
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<Token>>;

	/// Caches a token under `key`. `ttl` bounds the entry lifetime; `None` leaves
	/// eviction to the backend's own policy.
	fn set(&self, key: StoreKey, token: Token, ttl: Option<Duration>) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Cache key derived from a credential set's identity.
///
/// The key fingerprints the token endpoint and client id, so two distinct credential
/// sets never share a key and the same set always produces the same key across calls —
/// cached tokens cannot leak between client registrations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey(String);
impl StoreKey {
	const PREFIX: &'static str = "oauth2-token-";

	/// Derives the key for a credential set.
	pub fn for_credentials(credentials: &ClientCredentials) -> Self {
		let mut hasher = Sha256::new();

		hasher.update(credentials.token_endpoint().as_str().as_bytes());
		hasher.update(b"\n");
		hasher.update(credentials.client_id().as_bytes());

		let digest = hasher.finalize();

		Self(format!("{}{}", Self::PREFIX, STANDARD_NO_PAD.encode(digest)))
	}

	/// Returns the key's string form, as handed to cache backends.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
