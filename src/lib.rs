//! OAuth 2.0 client-credentials token broker—resolve client credentials per resource URI,
//! exchange or refresh access tokens, and reuse them through a pluggable fallible cache.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod credentials;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod http;
pub mod obs;
pub mod provider;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::OAuthTokenClient,
		credentials::CredentialsProvider,
		http::ReqwestTransport,
		provider::CachedTokenProvider,
		store::{MemoryStore, TokenStore},
	};

	/// Token client type used by reqwest-backed integration tests.
	pub type ReqwestTestClient = OAuthTokenClient<ReqwestTransport>;

	/// Builds a token client wired to the default reqwest transport.
	pub fn build_reqwest_test_client(credentials: Arc<dyn CredentialsProvider>) -> ReqwestTestClient {
		OAuthTokenClient::new(credentials, ReqwestTransport::default())
	}

	/// Constructs a [`CachedTokenProvider`] backed by an in-memory store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_provider(
		credentials: Arc<dyn CredentialsProvider>,
	) -> (CachedTokenProvider, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let client = Arc::new(build_reqwest_test_client(credentials));
		let provider = CachedTokenProvider::new(client, store);

		(provider, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
