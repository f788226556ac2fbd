//! Access token value object and the redacting secret wrapper.

// self
use crate::{_prelude::*, auth::ScopeList};

/// Redacted secret wrapper keeping token material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// OAuth 2.0 access token as decoded from a token endpoint response.
///
/// RFC 6749 §5.1 requires only `access_token` and `token_type`; everything else is
/// optional. A token without an expiry instant never reports itself expired. The
/// [`Display`] form is the raw access-token string so the token can be written straight
/// into an `Authorization` header; `Debug` stays redacted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
	access_token: TokenSecret,
	token_type: String,
	refresh_token: Option<TokenSecret>,
	scope: ScopeList,
	expires_at: Option<OffsetDateTime>,
}
impl Token {
	/// Creates a token from the two response fields RFC 6749 requires.
	pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: token_type.into(),
			refresh_token: None,
			scope: ScopeList::default(),
			expires_at: None,
		}
	}

	/// Attaches the refresh secret issued alongside the access token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Replaces the granted scope list.
	pub fn with_scope(mut self, scope: ScopeList) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Access token secret; callers must avoid logging it.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// The intended way to present the token (e.g. `bearer`).
	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	/// Refresh secret, if the server issued one.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref()
	}

	/// Scopes granted to this token.
	pub fn scope(&self) -> &ScopeList {
		&self.scope
	}

	/// Absolute expiry instant, if the server communicated one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Returns true if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant > expires_at)
	}

	/// Returns true if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at `instant`, when the token carries an expiry that has not
	/// passed yet.
	pub fn ttl_at(&self, instant: OffsetDateTime) -> Option<Duration> {
		let expires_at = self.expires_at?;

		if self.is_expired_at(instant) {
			return None;
		}

		Some(expires_at - instant)
	}
}
impl Display for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.access_token.expose())
	}
}
