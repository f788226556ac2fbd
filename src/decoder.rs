//! Response decoders that turn token endpoint replies into tokens or typed errors.
//!
//! Decoders are consulted in registration order; the first whose
//! [`supports`](ResponseDecoder::supports) predicate matches consumes the response. New
//! response shapes (additional grant types, vendor error formats) slot in as additional
//! decoders rather than inline status-code branches.

pub mod oauth_error;
pub mod token;

pub use oauth_error::OauthErrorDecoder;
pub use token::TokenDecoder;

// crates.io
use http::header::{CONTENT_TYPE, DATE};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::Token, error::RequestError, http::HttpResponse};

/// Decodes one shape of token endpoint response.
pub trait ResponseDecoder
where
	Self: Send + Sync,
{
	/// Returns true if this decoder can consume the response.
	fn supports(&self, response: &HttpResponse) -> bool;

	/// Consumes the response, producing a token or a typed failure.
	fn decode(&self, response: &HttpResponse) -> Result<Token>;
}

/// Returns true when the response declares a JSON content type.
pub(crate) fn is_json(response: &HttpResponse) -> bool {
	response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.is_some_and(|value| value.trim().eq_ignore_ascii_case("application/json"))
}

/// Parses the response body as JSON, reporting the failing path on mismatch.
pub(crate) fn parse_json<T>(response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RequestError::malformed_json(source, response.status().as_u16()).into())
}

/// Instant the response was produced, taken from the `Date` header when present.
///
/// Falls back to the local clock when the header is missing or unparseable, so expiry
/// computation degrades to client-side timing instead of failing the exchange.
pub(crate) fn response_date(response: &HttpResponse) -> OffsetDateTime {
	let Some(raw) = response.headers().get(DATE).and_then(|value| value.to_str().ok()) else {
		return OffsetDateTime::now_utc();
	};
	// HTTP dates carry the GMT zone name, which the RFC 2822 parser rejects.
	let normalized = raw.trim().replace("GMT", "+0000");

	OffsetDateTime::parse(&normalized, &Rfc2822).unwrap_or_else(|_| OffsetDateTime::now_utc())
}
