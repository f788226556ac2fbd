//! Token provisioning with cache reuse and refresh-or-reissue fallback.
//!
//! [`CachedTokenProvider`] implements the broker's single public operation: produce a
//! valid token for a resource URI. The external cache is advisory only — expiry is
//! re-checked on every call and store failures are swallowed — and a failed refresh
//! degrades to a fresh `client_credentials` exchange instead of surfacing to the caller.

// self
use crate::{
	_prelude::*,
	auth::Token,
	client::{ClientFuture, TokenClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{StoreKey, TokenStore},
};

/// Provides a valid access token, abstracting away the means to get one.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Returns a valid access token for the resource at `uri`.
	fn token<'a>(&'a self, uri: &'a Url) -> ClientFuture<'a, Token>;
}

/// [`TokenProvider`] that reuses issued tokens through an external [`TokenStore`].
///
/// Each call performs at most one cache read, one network exchange, and one cache write.
/// There is no single-flight de-duplication: concurrent callers observing the same cold
/// cache each perform their own exchange, and deployments needing stampede protection
/// must layer it on top, keyed by [`StoreKey`].
pub struct CachedTokenProvider {
	client: Arc<dyn TokenClient>,
	store: Arc<dyn TokenStore>,
}
impl CachedTokenProvider {
	/// Creates a provider over the given client + cache store pair.
	pub fn new(client: Arc<dyn TokenClient>, store: Arc<dyn TokenStore>) -> Self {
		Self { client, store }
	}

	async fn provide(&self, uri: &Url) -> Result<Token> {
		let key = self.client.store_key(uri)?;
		let cached = match self.store.get(&key).await {
			Ok(cached) => cached,
			Err(err) => {
				obs::record_store_failure("get", &err);

				None
			},
		};
		let token = match cached {
			None => self.client.request_token(uri).await?,
			Some(token) if token.is_expired() => self.renew(token, uri).await?,
			Some(token) => token,
		};

		self.store_token(key, &token).await;

		Ok(token)
	}

	/// Renews an expired token, falling back to a fresh request when the token has no
	/// refresh secret or the refresh exchange fails.
	async fn renew(&self, token: Token, uri: &Url) -> Result<Token> {
		if token.refresh_token().is_none() {
			return self.client.request_token(uri).await;
		}

		match self.client.refresh_token(&token, uri).await {
			Ok(fresh) => Ok(fresh),
			// Server rejections and network failures alike recover by re-authenticating
			// from scratch.
			Err(Error::Request(_) | Error::Authorization(_)) =>
				self.client.request_token(uri).await,
			Err(err) => Err(err),
		}
	}

	async fn store_token(&self, key: StoreKey, token: &Token) {
		let ttl = token.ttl_at(OffsetDateTime::now_utc());

		if let Err(err) = self.store.set(key, token.clone(), ttl).await {
			obs::record_store_failure("set", &err);
		}
	}
}
impl TokenProvider for CachedTokenProvider {
	fn token<'a>(&'a self, uri: &'a Url) -> ClientFuture<'a, Token> {
		const KIND: FlowKind = FlowKind::Provide;

		let span = FlowSpan::new(KIND, "token");

		Box::pin(async move {
			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

			let result = span.instrument(self.provide(uri)).await;

			match &result {
				Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
				Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			}

			result
		})
	}
}
impl Debug for CachedTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CachedTokenProvider(..)")
	}
}
