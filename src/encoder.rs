//! Pipeline adapter that stamps outbound requests with an `Authorization` header.

// crates.io
use http::header::{AUTHORIZATION, HeaderValue};
// self
use crate::{_prelude::*, error::RequestError, http::HttpRequest, provider::TokenProvider};

/// Produces `Authorization: <Type> <token>` header values for outbound requests.
///
/// The adapter is a thin veneer over [`TokenProvider`]: it asks for a valid token for the
/// request's target URI and renders it in presentation form, with the token type's first
/// letter upper-cased (`bearer` becomes `Bearer`).
pub struct AuthorizationEncoder {
	provider: Arc<dyn TokenProvider>,
}
impl AuthorizationEncoder {
	/// Creates an encoder over the given token provider.
	pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
		Self { provider }
	}

	/// Builds the header value for the resource at `uri`, e.g. `Bearer <token>`.
	pub async fn authorization_value(&self, uri: &Url) -> Result<String> {
		let token = self.provider.token(uri).await?;

		Ok(format!("{} {}", capitalize(token.token_type()), token))
	}

	/// Sets the `Authorization` header on `request` unless one is already present.
	pub async fn apply(&self, mut request: HttpRequest) -> Result<HttpRequest> {
		if request.headers().contains_key(AUTHORIZATION) {
			return Ok(request);
		}

		let uri = request.uri().to_string();
		let uri = Url::parse(&uri).map_err(|_| Error::InvalidUrl { url: uri })?;
		let value = self.authorization_value(&uri).await?;
		let value = HeaderValue::try_from(value)
			.map_err(|source| RequestError::build(source.into()))?;

		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(request)
	}
}
impl Debug for AuthorizationEncoder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AuthorizationEncoder(..)")
	}
}

fn capitalize(token_type: &str) -> String {
	let mut chars = token_type.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
		None => String::new(),
	}
}
