//! Fixtures shared by the relay integration tests.

#![allow(dead_code)]

// std
use std::net::SocketAddr;
// crates.io
use axum::{
	Router,
	body::Body,
	http::{
		HeaderMap, HeaderName, Method, Request, StatusCode,
		header::{ACCEPT, CONTENT_TYPE},
	},
	response::IntoResponse,
	routing::post,
};
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;
// self
use oauth2_relay::{
	config::{RelayConfig, Scope},
	flows::ReqwestRelay,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ProviderDescriptor,
	reqwest::{Client, redirect::Policy},
	server,
};

pub const CLIENT_ID: &str = "78f1ffae-it-client";
pub const CLIENT_SECRET: &str = "it-secret~with=chars&more";
pub const SCOPE: &str = "openid offline_access mail.read mail.send";
pub const REDIRECT_URI: &str = "http://localhost:5000/callback";
pub const AUTHORIZE_ENDPOINT: &str = "https://login.example.com/tenant/oauth2/v2.0/authorize";

/// Response captured from the relay router.
#[derive(Debug)]
pub struct Captured {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
}
impl Captured {
	pub fn text(&self) -> String {
		String::from_utf8(self.body.clone()).expect("Relay body should be UTF-8.")
	}
}

pub fn config(token_endpoint: &str) -> RelayConfig {
	let descriptor = ProviderDescriptor::builder()
		.authorization_endpoint(
			Url::parse(AUTHORIZE_ENDPOINT).expect("Authorize endpoint fixture should parse."),
		)
		.token_endpoint(Url::parse(token_endpoint).expect("Token endpoint fixture should parse."))
		.build()
		.expect("Descriptor fixture should validate.");

	RelayConfig::new(
		descriptor,
		CLIENT_ID,
		CLIENT_SECRET,
		Scope::new(SCOPE).expect("Scope fixture should validate."),
		Url::parse(REDIRECT_URI).expect("Redirect fixture should parse."),
	)
}

/// Reqwest client that trusts the self-signed certificate `httpmock` serves and, like the
/// production client, never follows redirects.
pub fn http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.redirect(Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn router(token_endpoint: &str) -> Router {
	let relay = ReqwestRelay::with_http_client(
		config(token_endpoint),
		http_client(),
		ReqwestTransportErrorMapper,
	);

	server::router(relay)
}

pub async fn send(router: Router, method: Method, uri: &str) -> Captured {
	let request = Request::builder()
		.method(method)
		.uri(uri)
		.body(Body::empty())
		.expect("Inbound request fixture should build.");
	let response = router.oneshot(request).await.expect("Router should answer.");
	let status = response.status();
	let headers = response.headers().clone();
	let body = response
		.into_body()
		.collect()
		.await
		.expect("Relay body should be readable.")
		.to_bytes()
		.to_vec();

	Captured { status, headers, body }
}

/// Token endpoint that answers 201 with the request headers and form body it received.
pub async fn spawn_echo_token_endpoint() -> String {
	async fn echo(headers: HeaderMap, body: String) -> impl IntoResponse {
		let header = |name: HeaderName| {
			headers.get(name).and_then(|value| value.to_str().ok()).unwrap_or_default().to_owned()
		};
		let reply = format!("accept={}\ncontent-type={}\n{body}", header(ACCEPT), header(CONTENT_TYPE));

		(StatusCode::CREATED, [(CONTENT_TYPE, "text/plain; charset=utf-8")], reply)
	}

	let listener =
		TcpListener::bind("127.0.0.1:0").await.expect("Echo endpoint should bind a free port.");
	let addr = listener.local_addr().expect("Echo endpoint should expose its address.");
	let app = Router::new().route("/token", post(echo));

	tokio::spawn(async move {
		let _ = axum::serve(listener, app).await;
	});

	format!("http://{addr}/token")
}

/// Address that refuses connections: bound once to learn a free port, then released.
pub async fn closed_endpoint() -> String {
	let listener =
		TcpListener::bind("127.0.0.1:0").await.expect("Probe listener should bind a free port.");
	let addr: SocketAddr = listener.local_addr().expect("Probe listener should expose its address.");

	drop(listener);

	format!("http://{addr}/token")
}
