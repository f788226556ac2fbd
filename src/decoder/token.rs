//! Success decoder for RFC 6749 §5.1 token responses.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Token},
	decoder::{self, ResponseDecoder},
	http::HttpResponse,
};

#[derive(Debug, Deserialize)]
struct TokenPayload {
	access_token: String,
	token_type: String,
	#[serde(default)]
	expires_in: Option<i64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	scope: Option<String>,
}

/// Decodes 2xx JSON responses into [`Token`] values.
///
/// `expires_in` is relative; it is anchored on the response's `Date` header to produce an
/// absolute expiry instant, falling back to the local clock when the header is absent.
/// Empty or non-positive optional fields are treated as not supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenDecoder;
impl ResponseDecoder for TokenDecoder {
	fn supports(&self, response: &HttpResponse) -> bool {
		response.status().is_success() && decoder::is_json(response)
	}

	fn decode(&self, response: &HttpResponse) -> Result<Token> {
		let issued_at = decoder::response_date(response);
		let payload = decoder::parse_json::<TokenPayload>(response)?;
		let mut token = Token::new(payload.access_token, payload.token_type);

		if let Some(expires_in) = payload.expires_in.filter(|seconds| *seconds > 0) {
			token = token.with_expires_at(issued_at + Duration::seconds(expires_in));
		}
		if let Some(refresh_token) = payload.refresh_token.filter(|value| !value.is_empty()) {
			token = token.with_refresh_token(refresh_token);
		}
		if let Some(scope) = payload.scope.filter(|value| !value.is_empty()) {
			token = token.with_scope(ScopeList::from_delimited(&scope));
		}

		Ok(token)
	}
}
