//! Error decoder for RFC 6749 §5.2 rejection responses.

// self
use crate::{
	_prelude::*,
	auth::Token,
	decoder::{self, ResponseDecoder},
	error::{AuthorizationError, AuthorizationErrorKind},
	http::HttpResponse,
};

#[derive(Debug, Deserialize)]
struct ErrorPayload {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
	#[serde(default)]
	error_uri: Option<String>,
}

/// Decodes 4xx JSON responses into typed [`AuthorizationError`] failures.
///
/// Decoding always short-circuits with a failure; a rejection response never yields a
/// token.
#[derive(Clone, Copy, Debug, Default)]
pub struct OauthErrorDecoder;
impl ResponseDecoder for OauthErrorDecoder {
	fn supports(&self, response: &HttpResponse) -> bool {
		response.status().is_client_error() && decoder::is_json(response)
	}

	fn decode(&self, response: &HttpResponse) -> Result<Token> {
		let payload = decoder::parse_json::<ErrorPayload>(response)?;
		let kind = AuthorizationErrorKind::from_code(&payload.error);
		let message = payload
			.error_description
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| payload.error.clone());
		let mut error = AuthorizationError::new(kind, message, response.status().as_u16());

		if let Some(info_uri) = payload.error_uri.filter(|value| !value.is_empty()) {
			error = error.with_info_uri(info_uri);
		}

		Err(error.into())
	}
}
