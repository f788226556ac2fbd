//! Demonstrates multi-tenant credential resolution: domain-suffix registrations with a
//! chain fallback, driving token exchanges against per-tenant endpoints.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_token_broker::{
	client::{OAuthTokenClient, TokenClient},
	credentials::{ChainProvider, ClientCredentials, CredentialsProvider, DomainProvider},
	http::ReqwestTransport,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/tenants/acme/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"acme-access\",\"token_type\":\"bearer\",\"expires_in\":600}",
			);
		})
		.await;
	let mut domains = DomainProvider::new();

	domains.add(
		ClientCredentials::new(
			"acme-service",
			"acme-secret",
			Url::parse(&server.url("/tenants/acme/token"))?,
		),
		["acme.example", "acme-staging.example"],
	)?;

	let mut chain = ChainProvider::default();

	chain.add(Box::new(domains));

	let resolver: Arc<dyn CredentialsProvider> = Arc::new(chain);
	let client = OAuthTokenClient::new(resolver, ReqwestTransport::default());
	let matched = Url::parse("https://api.acme.example/v1/orders")?;
	let token = client.request_token(&matched).await?;

	println!("token for {}: type {}", matched.host_str().unwrap_or_default(), token.token_type());

	let unmatched = Url::parse("https://api.other.example/v1/orders")?;

	match client.request_token(&unmatched).await {
		Err(err) => println!("unmatched host rejected: {err}"),
		Ok(_) => println!("unexpected token for unmatched host"),
	}

	Ok(())
}
