//! Demonstrates end-to-end token provisioning: resolve credentials, perform the
//! client-credentials exchange against a mock endpoint, cache the token, and render an
//! `Authorization` header for an outbound request.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_token_broker::{
	client::OAuthTokenClient,
	credentials::{ClientCredentials, CredentialsProvider, DefaultProvider},
	encoder::AuthorizationEncoder,
	http::ReqwestTransport,
	provider::{CachedTokenProvider, TokenProvider},
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let credentials = ClientCredentials::new(
		"demo-client",
		"demo-secret",
		Url::parse(&server.url("/token"))?,
	);
	let resolver: Arc<dyn CredentialsProvider> = Arc::new(DefaultProvider::new(credentials));
	let client = Arc::new(OAuthTokenClient::new(resolver, ReqwestTransport::default()));
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let provider = Arc::new(CachedTokenProvider::new(client, store));
	let target = Url::parse("https://api.example.com/v1/reports")?;
	let first = provider.token(&target).await?;
	let second = provider.token(&target).await?;

	println!("issued token type: {}", first.token_type());
	println!("reused from cache: {}", first == second);

	let encoder = AuthorizationEncoder::new(provider);
	let header = encoder.authorization_value(&target).await?;

	println!("authorization header: {header}");

	token_mock.assert_async().await;

	Ok(())
}
