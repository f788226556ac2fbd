//! Broker-level error types shared across resolvers, the token client, and the provider.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// No registered credentials match the target resource.
	///
	/// A configuration problem; the broker never retries it.
	#[error("No credentials found for {resource}.")]
	CredentialsNotFound {
		/// Host or full target the resolvers failed to match.
		resource: String,
	},
	/// Malformed host pattern supplied at registration time.
	#[error("Missing host in URL {url}.")]
	InvalidUrl {
		/// The offending pattern.
		url: String,
	},
	/// Network, transport, or decoding failure during a token exchange.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// The authorization server rejected the grant.
	#[error(transparent)]
	Authorization(#[from] AuthorizationError),
}

/// Failure raised while performing a token exchange, before a grant decision was decoded.
///
/// Carries an [`ExchangeContext`] so callers can report the request that was sent and the
/// response that came back, when either is known.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct RequestError {
	/// Human-readable summary of the failure.
	pub message: String,
	/// Diagnostics captured from the exchange.
	pub context: Box<ExchangeContext>,
	/// Underlying transport or decoding failure.
	#[source]
	pub source: Option<BoxError>,
}
impl RequestError {
	pub(crate) fn network(
		source: impl 'static + Send + Sync + std::error::Error,
		request: RequestSnapshot,
	) -> Self {
		Self {
			message: "Network error occurred while calling the token endpoint.".into(),
			context: Box::new(ExchangeContext { request: Some(request), ..Default::default() }),
			source: Some(Box::new(source)),
		}
	}

	pub(crate) fn build(source: http::Error) -> Self {
		Self {
			message: "Token request could not be constructed.".into(),
			context: Box::default(),
			source: Some(Box::new(source)),
		}
	}

	pub(crate) fn malformed_json(
		source: serde_path_to_error::Error<serde_json::Error>,
		status: u16,
	) -> Self {
		Self {
			message: "Token endpoint returned malformed JSON.".into(),
			context: Box::new(ExchangeContext { status: Some(status), ..Default::default() }),
			source: Some(Box::new(source)),
		}
	}

	pub(crate) fn no_decoder(status: u16) -> Self {
		Self {
			message: "No decoder could handle the token endpoint response.".into(),
			context: Box::new(ExchangeContext { status: Some(status), ..Default::default() }),
			source: None,
		}
	}

	pub(crate) fn missing_refresh_token() -> Self {
		Self {
			message: "Token does not carry a refresh token.".into(),
			context: Box::default(),
			source: None,
		}
	}
}

/// Typed rejection reported by the authorization server (RFC 6749 §5.2).
#[derive(Debug, ThisError)]
#[error("Token endpoint rejected the grant ({kind}): {message}.")]
pub struct AuthorizationError {
	/// Classified error code.
	pub kind: AuthorizationErrorKind,
	/// Server-supplied description, or the raw error code when none was given.
	pub message: String,
	/// HTTP status of the rejection response.
	pub status: u16,
	/// Human-readable information page advertised via `error_uri`.
	pub info_uri: Option<String>,
	/// Diagnostics captured from the exchange.
	pub context: Box<ExchangeContext>,
}
impl AuthorizationError {
	/// Creates a rejection with the given classification, message, and HTTP status.
	pub fn new(kind: AuthorizationErrorKind, message: impl Into<String>, status: u16) -> Self {
		Self {
			kind,
			message: message.into(),
			status,
			info_uri: None,
			context: Box::default(),
		}
	}

	/// Attaches the `error_uri` advertised by the server.
	pub fn with_info_uri(mut self, uri: impl Into<String>) -> Self {
		self.info_uri = Some(uri.into());

		self
	}
}

/// Machine-readable error codes defined by RFC 6749 §5.2, open to vendor extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationErrorKind {
	/// The request is missing a parameter or is otherwise malformed.
	InvalidRequest,
	/// Client authentication failed.
	InvalidClient,
	/// The provided grant or refresh token is invalid, expired, or revoked.
	InvalidGrant,
	/// The client is not authorized to use this grant type.
	UnauthorizedClient,
	/// The grant type is not supported by the authorization server.
	UnsupportedGrantType,
	/// The requested scope is invalid or exceeds what was granted.
	InvalidScope,
	/// A code outside the RFC 6749 set, kept verbatim.
	Other(String),
}
impl AuthorizationErrorKind {
	/// Classifies a machine-readable error code. Matching is exact and case-sensitive;
	/// unrecognized codes are preserved as [`Other`](Self::Other).
	pub fn from_code(code: &str) -> Self {
		match code {
			"invalid_request" => Self::InvalidRequest,
			"invalid_client" => Self::InvalidClient,
			"invalid_grant" => Self::InvalidGrant,
			"unauthorized_client" => Self::UnauthorizedClient,
			"unsupported_grant_type" => Self::UnsupportedGrantType,
			"invalid_scope" => Self::InvalidScope,
			_ => Self::Other(code.into()),
		}
	}

	/// Returns the wire form of the code.
	pub fn as_code(&self) -> &str {
		match self {
			Self::InvalidRequest => "invalid_request",
			Self::InvalidClient => "invalid_client",
			Self::InvalidGrant => "invalid_grant",
			Self::UnauthorizedClient => "unauthorized_client",
			Self::UnsupportedGrantType => "unsupported_grant_type",
			Self::InvalidScope => "invalid_scope",
			Self::Other(code) => code,
		}
	}
}
impl Display for AuthorizationErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_code())
	}
}

/// Diagnostics describing one token exchange, attached to failures after the fact.
#[derive(Clone, Debug, Default)]
pub struct ExchangeContext {
	/// The request that was sent; prefers the transport's own record of what went out over
	/// the request the broker built.
	pub request: Option<RequestSnapshot>,
	/// HTTP status of the response, when one was received.
	pub status: Option<u16>,
	/// Truncated response body for diagnostics.
	pub body_preview: Option<String>,
}
impl ExchangeContext {
	pub(crate) fn fill(
		&mut self,
		request: RequestSnapshot,
		status: u16,
		body_preview: Option<String>,
	) {
		self.request.get_or_insert(request);
		self.status.get_or_insert(status);

		if self.body_preview.is_none() {
			self.body_preview = body_preview;
		}
	}
}

/// Method + URI pair identifying a request without retaining its body or secrets.
#[derive(Clone, Debug)]
pub struct RequestSnapshot {
	/// HTTP method.
	pub method: String,
	/// Full request URI.
	pub uri: String,
}
impl RequestSnapshot {
	pub(crate) fn of(request: &crate::http::HttpRequest) -> Self {
		Self { method: request.method().to_string(), uri: request.uri().to_string() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn classifier_maps_rfc6749_codes() {
		assert_eq!(
			AuthorizationErrorKind::from_code("invalid_request"),
			AuthorizationErrorKind::InvalidRequest
		);
		assert_eq!(
			AuthorizationErrorKind::from_code("invalid_client"),
			AuthorizationErrorKind::InvalidClient
		);
		assert_eq!(
			AuthorizationErrorKind::from_code("invalid_grant"),
			AuthorizationErrorKind::InvalidGrant
		);
		assert_eq!(
			AuthorizationErrorKind::from_code("unauthorized_client"),
			AuthorizationErrorKind::UnauthorizedClient
		);
		assert_eq!(
			AuthorizationErrorKind::from_code("unsupported_grant_type"),
			AuthorizationErrorKind::UnsupportedGrantType
		);
		assert_eq!(
			AuthorizationErrorKind::from_code("invalid_scope"),
			AuthorizationErrorKind::InvalidScope
		);
	}

	#[test]
	fn classifier_preserves_vendor_codes() {
		let kind = AuthorizationErrorKind::from_code("slow_down");

		assert_eq!(kind, AuthorizationErrorKind::Other("slow_down".into()));
		assert_eq!(kind.as_code(), "slow_down");
	}

	#[test]
	fn classifier_is_case_sensitive() {
		assert_eq!(
			AuthorizationErrorKind::from_code("Invalid_Grant"),
			AuthorizationErrorKind::Other("Invalid_Grant".into())
		);
	}

	#[test]
	fn credentials_not_found_names_the_resource() {
		let err = Error::CredentialsNotFound { resource: "api.example.com".into() };

		assert!(err.to_string().contains("api.example.com"));
	}

	#[test]
	fn authorization_error_renders_kind_and_message() {
		let err = AuthorizationError::new(
			AuthorizationErrorKind::InvalidGrant,
			"refresh token revoked",
			400,
		)
		.with_info_uri("https://auth.example.com/errors/invalid_grant");

		assert!(err.to_string().contains("invalid_grant"));
		assert!(err.to_string().contains("refresh token revoked"));
		assert_eq!(
			err.info_uri.as_deref(),
			Some("https://auth.example.com/errors/invalid_grant")
		);
	}

	#[test]
	fn exchange_context_fill_keeps_existing_fields() {
		let mut context = ExchangeContext {
			status: Some(400),
			..Default::default()
		};

		context.fill(
			RequestSnapshot { method: "POST".into(), uri: "https://auth.example.com/token".into() },
			500,
			Some("{}".into()),
		);

		assert_eq!(context.status, Some(400));
		assert_eq!(context.body_preview.as_deref(), Some("{}"));
		assert_eq!(
			context.request.expect("Request snapshot should be filled in.").uri,
			"https://auth.example.com/token"
		);
	}
}
