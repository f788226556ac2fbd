//! Transport primitives for OAuth token exchanges.
//!
//! [`TokenTransport`] is the broker's only dependency on an HTTP stack: implementations
//! execute one prepared token request and hand back the raw response. Failures surface
//! as [`TransportFailure`] values that keep hold of the URL the request was actually
//! sent to (when the underlying error exposes it), so the error layer can report the
//! transmitted request rather than the one the broker built.

// self
use crate::_prelude::*;

/// Request type exchanged with the transport.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response type produced by the transport.
pub type HttpResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`TokenTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportFailure>> + 'a + Send>>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Abstraction over HTTP transports capable of executing OAuth token exchanges.
///
/// The broker sends exactly one request per exchange and never retries; callers wanting
/// timeouts, proxies, or TLS tuning configure them on the injected implementation.
pub trait TokenTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the prepared token request.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Network-or-protocol failure raised by a [`TokenTransport`].
#[derive(Debug, ThisError)]
#[error("Transport failed while calling the token endpoint.")]
pub struct TransportFailure {
	#[source]
	source: BoxError,
	sent_to: Option<Url>,
}
impl TransportFailure {
	/// Wraps a transport-specific error.
	pub fn new(source: impl 'static + Send + Sync + StdError) -> Self {
		Self { source: Box::new(source), sent_to: None }
	}

	/// Records the URL of the request that was actually transmitted.
	pub fn with_sent_to(mut self, url: Url) -> Self {
		self.sent_to = Some(url);

		self
	}

	/// URL of the request that was actually transmitted, when the transport exposed it.
	pub fn sent_to(&self) -> Option<&Url> {
		self.sent_to.as_ref()
	}
}

/// Thin wrapper around [`ReqwestClient`] implementing [`TokenTransport`].
///
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI. Configure any
/// custom [`ReqwestClient`] accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl TokenTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request).map_err(TransportFailure::new)?;
			let requested = request.url().clone();
			let response = client.execute(request).await.map_err(|e| {
				let sent_to = e.url().cloned().unwrap_or(requested);

				TransportFailure::new(e).with_sent_to(sent_to)
			})?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportFailure::new)?.to_vec();
			let mut rebuilt = HttpResponse::new(body);

			*rebuilt.status_mut() = status;
			*rebuilt.headers_mut() = headers;

			Ok(rebuilt)
		})
	}
}
