//! Token acquisition client: builds grant requests, sends them, and decodes the reply.
//!
//! [`OAuthTokenClient`] implements the two RFC 6749 exchanges the broker needs
//! (`client_credentials` and `refresh_token`). Each call resolves credentials for the
//! target URI, submits one form-encoded POST to the credential set's token endpoint, and
//! runs the response through an ordered decoder chain. Failures carry the request and
//! response diagnostics the exchange produced.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::Token,
	credentials::{ClientCredentials, CredentialsProvider},
	decoder::{OauthErrorDecoder, ResponseDecoder, TokenDecoder},
	error::{RequestError, RequestSnapshot},
	http::{HttpRequest, HttpResponse, TokenTransport, TransportFailure},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreKey,
};

/// Boxed future returned by [`TokenClient`] and
/// [`TokenProvider`](crate::provider::TokenProvider) operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// OAuth 2.0 grant types the client can negotiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// `client_credentials` grant (RFC 6749 §4.4).
	ClientCredentials,
	/// `refresh_token` grant (RFC 6749 §6).
	RefreshToken,
}
impl GrantType {
	/// Returns the wire value for the `grant_type` body parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Obtains tokens from the authorization server on behalf of the provider layer.
pub trait TokenClient
where
	Self: Send + Sync,
{
	/// Requests a new access token for the resource at `uri`.
	fn request_token<'a>(&'a self, uri: &'a Url) -> ClientFuture<'a, Token>;

	/// Exchanges `token`'s refresh secret for a fresh access token.
	fn refresh_token<'a>(&'a self, token: &'a Token, uri: &'a Url) -> ClientFuture<'a, Token>;

	/// Derives the cache key identifying the credentials responsible for `uri`.
	fn store_key(&self, uri: &Url) -> Result<StoreKey>;
}

/// [`TokenClient`] performing RFC 6749 token exchanges over a [`TokenTransport`].
pub struct OAuthTokenClient<C>
where
	C: ?Sized + TokenTransport,
{
	transport: Arc<C>,
	credentials: Arc<dyn CredentialsProvider>,
	decoders: Vec<Box<dyn ResponseDecoder>>,
}
impl<C> OAuthTokenClient<C>
where
	C: ?Sized + TokenTransport,
{
	/// Creates a client with the standard success + error decoder pair.
	pub fn new(credentials: Arc<dyn CredentialsProvider>, transport: impl Into<Arc<C>>) -> Self {
		Self {
			transport: transport.into(),
			credentials,
			decoders: vec![Box::new(TokenDecoder), Box::new(OauthErrorDecoder)],
		}
	}

	/// Appends a decoder consulted after the built-in ones.
	pub fn with_decoder(mut self, decoder: Box<dyn ResponseDecoder>) -> Self {
		self.decoders.push(decoder);

		self
	}

	async fn submit(&self, form: Vec<(&'static str, String)>, uri: &Url) -> Result<Token> {
		let credentials = self.credentials.resolve(uri)?;
		let request = self.build_request(form, credentials)?;
		let snapshot = RequestSnapshot::of(&request);
		let response = match self.transport.send(request).await {
			Ok(response) => response,
			Err(failure) => return Err(transport_error(failure, snapshot).into()),
		};

		match self.parse_response(&response) {
			Ok(token) => Ok(token),
			Err(err) => Err(attach_context(err, snapshot, &response)),
		}
	}

	fn build_request(
		&self,
		mut form: Vec<(&'static str, String)>,
		credentials: &ClientCredentials,
	) -> Result<HttpRequest> {
		let mut builder = http::Request::builder()
			.method(Method::POST)
			.uri(credentials.token_endpoint().as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded");

		if credentials.use_basic_auth() {
			builder = builder.header(AUTHORIZATION, basic_authorization(credentials));
		} else {
			form.push(("client_id", credentials.client_id().to_owned()));
			form.push(("client_secret", credentials.client_secret().expose().to_owned()));
		}

		let body = form_urlencoded::Serializer::new(String::new())
			.extend_pairs(form.iter().map(|(key, value)| (*key, value.as_str())))
			.finish()
			.into_bytes();

		builder.body(body).map_err(|source| RequestError::build(source).into())
	}

	fn parse_response(&self, response: &HttpResponse) -> Result<Token> {
		for decoder in &self.decoders {
			if decoder.supports(response) {
				return decoder.decode(response);
			}
		}

		Err(RequestError::no_decoder(response.status().as_u16()).into())
	}
}
impl<C> TokenClient for OAuthTokenClient<C>
where
	C: ?Sized + TokenTransport,
{
	fn request_token<'a>(&'a self, uri: &'a Url) -> ClientFuture<'a, Token> {
		const KIND: FlowKind = FlowKind::ClientCredentials;

		let span = FlowSpan::new(KIND, "request_token");

		Box::pin(async move {
			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

			let result = span
				.instrument(async move {
					let form =
						vec![("grant_type", GrantType::ClientCredentials.as_str().to_owned())];

					self.submit(form, uri).await
				})
				.await;

			match &result {
				Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
				Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			}

			result
		})
	}

	fn refresh_token<'a>(&'a self, token: &'a Token, uri: &'a Url) -> ClientFuture<'a, Token> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_token");

		Box::pin(async move {
			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

			let result = span
				.instrument(async move {
					let Some(refresh_token) = token.refresh_token() else {
						return Err(RequestError::missing_refresh_token().into());
					};
					let form = vec![
						("grant_type", GrantType::RefreshToken.as_str().to_owned()),
						("refresh_token", refresh_token.expose().to_owned()),
					];

					self.submit(form, uri).await
				})
				.await;

			match &result {
				Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
				Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			}

			result
		})
	}

	fn store_key(&self, uri: &Url) -> Result<StoreKey> {
		Ok(StoreKey::for_credentials(self.credentials.resolve(uri)?))
	}
}
impl<C> Debug for OAuthTokenClient<C>
where
	C: ?Sized + TokenTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthTokenClient").field("decoders", &self.decoders.len()).finish()
	}
}

fn basic_authorization(credentials: &ClientCredentials) -> String {
	let pair = format!("{}:{}", credentials.client_id(), credentials.client_secret().expose());

	format!("Basic {}", STANDARD.encode(pair))
}

fn transport_error(failure: TransportFailure, built: RequestSnapshot) -> RequestError {
	let request = match failure.sent_to() {
		Some(url) =>
			RequestSnapshot { method: Method::POST.to_string(), uri: url.to_string() },
		None => built,
	};

	RequestError::network(failure, request)
}

fn attach_context(err: Error, request: RequestSnapshot, response: &HttpResponse) -> Error {
	let status = response.status().as_u16();
	let preview = body_preview(response);

	match err {
		Error::Request(mut inner) => {
			inner.context.fill(request, status, preview);

			Error::Request(inner)
		},
		Error::Authorization(mut inner) => {
			inner.context.fill(request, status, preview);

			Error::Authorization(inner)
		},
		other => other,
	}
}

fn body_preview(response: &HttpResponse) -> Option<String> {
	if response.body().is_empty() {
		return None;
	}

	let text = String::from_utf8_lossy(response.body());

	Some(text.chars().take(BODY_PREVIEW_LIMIT).collect())
}

#[cfg(test)]
mod tests {
	// std
	use std::io;
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::{
		credentials::{DefaultProvider, DomainProvider},
		error::AuthorizationErrorKind,
	};

	// (method, uri, headers, body) as seen by the transport.
	type SeenRequest = (String, String, Vec<(String, String)>, Vec<u8>);

	enum Reply {
		Respond(Box<dyn Fn() -> HttpResponse + Send + Sync>),
		Fail(Box<dyn Fn() -> TransportFailure + Send + Sync>),
	}

	struct RecordingTransport {
		reply: Reply,
		seen: Mutex<Vec<SeenRequest>>,
	}
	impl RecordingTransport {
		fn respond(build: impl Fn() -> HttpResponse + Send + Sync + 'static) -> Arc<Self> {
			Arc::new(Self { reply: Reply::Respond(Box::new(build)), seen: Mutex::new(Vec::new()) })
		}

		fn fail(build: impl Fn() -> TransportFailure + Send + Sync + 'static) -> Arc<Self> {
			Arc::new(Self { reply: Reply::Fail(Box::new(build)), seen: Mutex::new(Vec::new()) })
		}

		fn requests(&self) -> Vec<SeenRequest> {
			self.seen.lock().clone()
		}
	}
	impl TokenTransport for RecordingTransport {
		fn send(&self, request: HttpRequest) -> crate::http::TransportFuture<'_> {
			let headers = request
				.headers()
				.iter()
				.map(|(name, value)| {
					(name.to_string(), value.to_str().unwrap_or_default().to_owned())
				})
				.collect();

			self.seen.lock().push((
				request.method().to_string(),
				request.uri().to_string(),
				headers,
				request.body().clone(),
			));

			Box::pin(async move {
				match &self.reply {
					Reply::Respond(build) => Ok(build()),
					Reply::Fail(build) => Err(build()),
				}
			})
		}
	}

	fn token_response() -> HttpResponse {
		http::Response::builder()
			.status(200)
			.header("content-type", "application/json")
			.body(
				br#"{"access_token":"issued","token_type":"bearer","expires_in":600}"#.to_vec(),
			)
			.expect("Response fixture should build.")
	}

	fn provider(basic: bool) -> Arc<dyn CredentialsProvider> {
		let endpoint =
			Url::parse("https://auth.example.com/token").expect("Endpoint fixture should parse.");
		let mut credentials = ClientCredentials::new("svc-id", "svc-secret", endpoint);

		credentials.set_basic_auth(basic);

		Arc::new(DefaultProvider::new(credentials))
	}

	fn target() -> Url {
		Url::parse("https://api.example.com/v1").expect("Target fixture should parse.")
	}

	fn form_pairs(body: &[u8]) -> Vec<(String, String)> {
		form_urlencoded::parse(body).into_owned().collect()
	}

	fn header<'a>(
		headers: &'a [(String, String)],
		name: &str,
	) -> Option<&'a str> {
		headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	#[tokio::test]
	async fn request_token_posts_the_client_credentials_grant() {
		let transport = RecordingTransport::respond(token_response);
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport.clone());
		let token = client
			.request_token(&target())
			.await
			.expect("Client credentials exchange should succeed.");

		assert_eq!(token.access_token().expose(), "issued");

		let requests = transport.requests();

		assert_eq!(requests.len(), 1);

		let (method, uri, headers, body) = &requests[0];

		assert_eq!(method, "POST");
		assert_eq!(uri, "https://auth.example.com/token");
		assert_eq!(
			header(headers, "content-type"),
			Some("application/x-www-form-urlencoded")
		);
		assert_eq!(header(headers, "authorization"), None);

		let pairs = form_pairs(body);

		assert!(pairs.contains(&("grant_type".into(), "client_credentials".into())));
		assert!(pairs.contains(&("client_id".into(), "svc-id".into())));
		assert!(pairs.contains(&("client_secret".into(), "svc-secret".into())));
	}

	#[tokio::test]
	async fn basic_auth_moves_credentials_into_the_header() {
		let transport = RecordingTransport::respond(token_response);
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(true), transport.clone());

		client.request_token(&target()).await.expect("Exchange should succeed.");

		let requests = transport.requests();
		let (_, _, headers, body) = &requests[0];

		// base64("svc-id:svc-secret")
		assert_eq!(header(headers, "authorization"), Some("Basic c3ZjLWlkOnN2Yy1zZWNyZXQ="));

		let pairs = form_pairs(body);

		assert!(pairs.iter().all(|(key, _)| key != "client_id" && key != "client_secret"));
		assert!(pairs.contains(&("grant_type".into(), "client_credentials".into())));
	}

	#[tokio::test]
	async fn refresh_token_posts_the_refresh_grant() {
		let transport = RecordingTransport::respond(token_response);
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport.clone());
		let expired = Token::new("old", "bearer").with_refresh_token("refresh-secret");

		client
			.refresh_token(&expired, &target())
			.await
			.expect("Refresh exchange should succeed.");

		let requests = transport.requests();
		let pairs = form_pairs(&requests[0].3);

		assert!(pairs.contains(&("grant_type".into(), "refresh_token".into())));
		assert!(pairs.contains(&("refresh_token".into(), "refresh-secret".into())));
	}

	#[tokio::test]
	async fn refresh_without_a_refresh_secret_fails_fast() {
		let transport = RecordingTransport::respond(token_response);
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport.clone());
		let bare = Token::new("old", "bearer");
		let err = client
			.refresh_token(&bare, &target())
			.await
			.expect_err("Refreshing without a refresh token must fail.");

		assert!(matches!(err, Error::Request(_)));
		assert!(transport.requests().is_empty());
	}

	#[tokio::test]
	async fn unresolved_credentials_short_circuit_before_the_transport() {
		let transport = RecordingTransport::respond(token_response);
		let client = OAuthTokenClient::<RecordingTransport>::new(
			Arc::new(DomainProvider::new()),
			transport.clone(),
		);
		let err = client
			.request_token(&target())
			.await
			.expect_err("Resolution failure must propagate.");

		assert!(matches!(err, Error::CredentialsNotFound { .. }));
		assert!(transport.requests().is_empty());
		assert!(client.store_key(&target()).is_err());
	}

	#[tokio::test]
	async fn unhandled_responses_surface_as_request_errors() {
		let transport = RecordingTransport::respond(|| {
			http::Response::builder()
				.status(503)
				.header("content-type", "text/plain")
				.body(b"upstream down".to_vec())
				.expect("Response fixture should build.")
		});
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport);
		let err = client
			.request_token(&target())
			.await
			.expect_err("A 5xx response has no decoder and must fail.");

		let Error::Request(inner) = err else {
			panic!("Unhandled responses should map to Error::Request.");
		};

		assert_eq!(inner.context.status, Some(503));
		assert_eq!(inner.context.body_preview.as_deref(), Some("upstream down"));
		assert_eq!(
			inner.context.request.as_ref().map(|snapshot| snapshot.uri.as_str()),
			Some("https://auth.example.com/token")
		);
	}

	#[tokio::test]
	async fn rejections_carry_exchange_diagnostics() {
		let transport = RecordingTransport::respond(|| {
			http::Response::builder()
				.status(400)
				.header("content-type", "application/json")
				.body(br#"{"error":"invalid_grant"}"#.to_vec())
				.expect("Response fixture should build.")
		});
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport);
		let err = client
			.request_token(&target())
			.await
			.expect_err("A rejection response must fail.");

		let Error::Authorization(inner) = err else {
			panic!("Rejections should map to Error::Authorization.");
		};

		assert_eq!(inner.kind, AuthorizationErrorKind::InvalidGrant);
		assert_eq!(inner.context.status, Some(400));
		assert!(inner.context.request.is_some());
	}

	#[tokio::test]
	async fn transport_failures_prefer_the_transmitted_request() {
		let transport = RecordingTransport::fail(|| {
			let sent_to = Url::parse("https://proxy.example.net/token")
				.expect("Fixture should parse.");

			TransportFailure::new(io::Error::other("connection reset")).with_sent_to(sent_to)
		});
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport);
		let err = client
			.request_token(&target())
			.await
			.expect_err("A transport failure must surface.");

		let Error::Request(inner) = err else {
			panic!("Transport failures should map to Error::Request.");
		};

		assert_eq!(
			inner.context.request.as_ref().map(|snapshot| snapshot.uri.as_str()),
			Some("https://proxy.example.net/token")
		);
		assert!(inner.source.is_some());
	}

	#[tokio::test]
	async fn store_key_matches_the_resolved_credentials() {
		let transport = RecordingTransport::respond(token_response);
		let client = OAuthTokenClient::<RecordingTransport>::new(provider(false), transport);
		let key = client.store_key(&target()).expect("Key derivation should succeed.");

		assert!(key.as_str().starts_with("oauth2-token-"));
		assert_eq!(
			client.store_key(&target()).expect("Key derivation should be deterministic."),
			key
		);
	}
}
