//! Authorization code exchange: one form-encoded POST, relayed back byte for byte.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest, HttpResponse,
	http::{
		Method,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	config::{ClientSecret, RelayConfig},
	error::ConfigError,
	flows::Relay,
	http::{ResponseMetadataSlot, TokenHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	oauth::TransportErrorMapper,
};

/// `grant_type` sent with every exchange.
pub const GRANT_TYPE: &str = "authorization_code";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenExchangeResponse>> + 'a + Send>>;

/// Form parameters POSTed to the token endpoint for a single callback.
#[derive(Clone, Debug)]
pub struct TokenExchangeRequest<'a> {
	/// OAuth 2.0 client identifier.
	pub client_id: &'a str,
	/// Scope string, identical to the one sent to the authorize endpoint.
	pub scope: &'a str,
	/// Authorization code from the callback query.
	pub code: &'a str,
	/// Redirect URI, identical to the one sent to the authorize endpoint.
	pub redirect_uri: &'a str,
	/// Confidential client secret.
	pub client_secret: &'a ClientSecret,
}
impl<'a> TokenExchangeRequest<'a> {
	/// Collects the exchange parameters for `code`.
	pub fn new(config: &'a RelayConfig, code: &'a str) -> Self {
		Self {
			client_id: &config.client_id,
			scope: config.scope.as_str(),
			code,
			redirect_uri: config.redirect_uri.as_str(),
			client_secret: &config.client_secret,
		}
	}

	/// Form fields in wire order.
	pub fn form_pairs(&self) -> [(&'static str, &'a str); 6] {
		[
			("client_id", self.client_id),
			("scope", self.scope),
			("code", self.code),
			("redirect_uri", self.redirect_uri),
			("client_secret", self.client_secret.expose()),
			("grant_type", GRANT_TYPE),
		]
	}

	/// Encodes the form body as `application/x-www-form-urlencoded`.
	pub fn encode_form(&self) -> String {
		Serializer::new(String::new()).extend_pairs(self.form_pairs()).finish()
	}

	/// Assembles the outbound POST targeting `endpoint`.
	pub fn into_http_request(self, endpoint: &Url) -> Result<HttpRequest, ConfigError> {
		let request = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(ACCEPT, JSON_CONTENT_TYPE)
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.body(self.encode_form().into_bytes())?;

		Ok(request)
	}
}

/// Raw token endpoint answer.
///
/// The body is never parsed: a provider error such as `{"error":"invalid_grant"}` is a
/// regular response here, and callers inspect the body to tell success from failure.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenExchangeResponse {
	/// HTTP status the provider answered with.
	pub status: u16,
	/// Provider `Content-Type` header, when present and valid UTF-8.
	pub content_type: Option<String>,
	/// Response body exactly as received.
	pub body: Vec<u8>,
}
impl TokenExchangeResponse {
	/// Returns true when the provider answered with a 2xx status.
	pub fn is_provider_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}
impl From<HttpResponse> for TokenExchangeResponse {
	fn from(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);

		Self { status, content_type, body: response.into_body() }
	}
}
impl Debug for TokenExchangeResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchangeResponse")
			.field("status", &self.status)
			.field("content_type", &self.content_type)
			.field("body_len", &self.body.len())
			.finish()
	}
}

impl<C, M> Relay<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `code` at the token endpoint and returns the provider's raw answer.
	///
	/// Fails only when the request cannot be built or the transport cannot complete the
	/// round trip. Any HTTP status from the provider counts as success.
	pub fn exchange_code<'a>(&'a self, code: &'a str) -> ExchangeFuture<'a> {
		let span = FlowSpan::new(FlowKind::Callback, "exchange_code");

		Box::pin(span.instrument(async move {
			obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::Attempt);

			let result = self.exchange_code_inner(code).await;

			match &result {
				Ok(response) => {
					obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::Success);

					if response.is_provider_success() {
						tracing::info!(
							status = response.status,
							bytes = response.body.len(),
							"Token endpoint responded."
						);
					} else {
						tracing::warn!(
							status = response.status,
							bytes = response.body.len(),
							"Token endpoint answered with an error status; relaying it as 200."
						);
					}
				},
				Err(err) => {
					obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::Failure);
					tracing::error!(error = %err, "Token exchange failed.");
				},
			}

			result
		}))
	}

	async fn exchange_code_inner(&self, code: &str) -> Result<TokenExchangeResponse> {
		let endpoint = &self.config.descriptor.endpoints.token;
		let request = TokenExchangeRequest::new(&self.config, code).into_http_request(endpoint)?;

		tracing::info!(token_endpoint = %endpoint, "Posting authorization code.");

		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let response = handle
			.call(request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(meta.take().as_ref(), err))?;

		Ok(response.into())
	}
}
