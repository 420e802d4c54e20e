//! HTTP surface: the axum router exposing the redirect and callback legs.
//!
//! Both routes accept any method. `/request` answers `302 Found` pointing at the
//! provider's authorize endpoint; `/callback` trades the `code` query parameter for the
//! provider's token response and relays the body with status 200, whatever status the
//! provider used. Only a missing code (401) or an internal/transport failure (500) change
//! the status.

// std
use std::{future::pending, io};
// crates.io
use axum::{
	Router,
	extract::{RawQuery, State},
	http::{
		HeaderValue, StatusCode, Uri,
		header::{CONTENT_TYPE, LOCATION},
	},
	response::{IntoResponse, Response},
	routing::any,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	flows::{Relay, TokenExchangeResponse},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	oauth::TransportErrorMapper,
};

/// Path that starts the authorization flow.
pub const REQUEST_PATH: &str = "/request";
/// Path the provider redirects back to with the authorization code.
pub const CALLBACK_PATH: &str = "/callback";

/// Builds the relay router.
///
/// Trailing-slash variants (`/request/`, `/callback/`) answer `301 Moved Permanently`
/// pointing at the canonical path with the query string preserved.
pub fn router<C, M>(relay: Relay<C, M>) -> Router
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	Router::new()
		.route(REQUEST_PATH, any(redirect::<C, M>))
		.route(CALLBACK_PATH, any(callback::<C, M>))
		.route("/request/", any(strip_trailing_slash))
		.route("/callback/", any(strip_trailing_slash))
		.layer(TraceLayer::new_for_http())
		.with_state(relay)
}

/// Serves `relay` on `listener` until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<C, M, S>(relay: Relay<C, M>, listener: TcpListener, shutdown: S) -> io::Result<()>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	S: 'static + Send + Future<Output = ()>,
{
	tracing::info!(addr = %listener.local_addr()?, "Relay listening.");

	axum::serve(listener, router(relay)).with_graceful_shutdown(shutdown).await?;

	tracing::info!("Relay stopped.");

	Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			tracing::error!(error = %err, "Failed to install the Ctrl+C handler.");
			pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(err) => {
				tracing::error!(error = %err, "Failed to install the SIGTERM handler.");
				pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = pending::<()>();

	tokio::select! {
		_ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down."),
		_ = terminate => tracing::info!("Received SIGTERM, shutting down."),
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			.into_response()
	}
}

async fn redirect<C, M>(State(relay): State<Relay<C, M>>) -> Response
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let span = FlowSpan::new(FlowKind::Redirect, "redirect");

	span.instrument(async move {
		tracing::info!("Incoming redirect request.");
		obs::record_flow_outcome(FlowKind::Redirect, FlowOutcome::Attempt);

		let url = relay.authorize_url();

		tracing::info!(authorize_endpoint = %url, "Redirecting to the authorize endpoint.");
		obs::record_flow_outcome(FlowKind::Redirect, FlowOutcome::Success);

		(StatusCode::FOUND, [(LOCATION, url.as_str())]).into_response()
	})
	.await
}

async fn callback<C, M>(State(relay): State<Relay<C, M>>, RawQuery(query): RawQuery) -> Response
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let span = FlowSpan::new(FlowKind::Callback, "callback");

	span.instrument(async move {
		tracing::info!("Callback received.");

		let Some(code) = extract_code(query.as_deref()) else {
			tracing::info!("No code on request.");
			obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::Rejected);

			return Error::MissingCode.into_response();
		};

		match relay.exchange_code(&code).await {
			Ok(exchange) => relay_response(exchange),
			Err(err) => err.into_response(),
		}
	})
	.await
}

async fn strip_trailing_slash(uri: Uri) -> Response {
	let path = uri.path().trim_end_matches('/');
	let location = match uri.query() {
		Some(query) => format!("{path}?{query}"),
		None => path.to_owned(),
	};

	(StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response()
}

/// First `code` value in the query string; presence matters, an empty value still counts.
fn extract_code(query: Option<&str>) -> Option<String> {
	form_urlencoded::parse(query?.as_bytes())
		.find(|(key, _)| key == "code")
		.map(|(_, value)| value.into_owned())
}

fn relay_response(exchange: TokenExchangeResponse) -> Response {
	let content_type =
		exchange.content_type.as_deref().and_then(|value| HeaderValue::from_str(value).ok());
	let mut response = (StatusCode::OK, exchange.body).into_response();

	if let Some(content_type) = content_type {
		response.headers_mut().insert(CONTENT_TYPE, content_type);
	}

	response
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::{body::Body, http::Request};
	use tower::ServiceExt;
	use tracing::{Event, Subscriber};
	use tracing_subscriber::{
		Layer,
		layer::{Context, SubscriberExt},
		registry::LookupSpan,
	};
	// self
	use super::*;
	#[cfg(feature = "reqwest")] use crate::_preludet::*;

	#[test]
	fn code_extraction_takes_the_first_value() {
		assert_eq!(extract_code(Some("code=abc&state=12345")), Some("abc".into()));
		assert_eq!(extract_code(Some("state=1&code=a%2Bb&code=second")), Some("a+b".into()));
		assert_eq!(extract_code(Some("code=")), Some(String::new()));
		assert_eq!(extract_code(Some("state=12345&error=access_denied")), None);
		assert_eq!(extract_code(None), None);
	}

	#[test]
	fn errors_render_their_status_without_a_body() {
		let response = Error::MissingCode.into_response();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert!(response.headers().get(CONTENT_TYPE).is_none());
	}

	#[test]
	fn relayed_responses_keep_the_provider_content_type() {
		let response = relay_response(TokenExchangeResponse {
			status: 400,
			content_type: Some("application/json; charset=utf-8".into()),
			body: b"{\"error\":\"invalid_grant\"}".to_vec(),
		});

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(response.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn router_answers_request_with_a_found_redirect() {
		let relay = build_reqwest_test_relay("http://127.0.0.1:9/token");
		let expected = relay.authorize_url();
		let request =
			Request::builder().uri(REQUEST_PATH).body(Body::empty()).expect("Request should build.");
		let response = router(relay).oneshot(request).await.expect("Router should answer.");

		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(response.headers()[LOCATION], expected.as_str());
		assert!(expected.as_str().starts_with("https://login.example.com/authorize?client_id="));
		assert!(expected.as_str().contains(&format!("client_id={TEST_CLIENT_ID}&")));
	}

	// Records the target of every event together with the span it was emitted in.
	#[derive(Clone, Default)]
	struct EventSpans(Arc<Mutex<Vec<(String, Option<&'static str>)>>>);
	impl<S> Layer<S> for EventSpans
	where
		S: Subscriber + for<'a> LookupSpan<'a>,
	{
		fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
			let span = ctx.event_span(event).map(|span| span.name());

			self.0.lock().push((event.metadata().target().to_owned(), span));
		}
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn redirect_events_are_logged_inside_the_flow_span() {
		let spans = EventSpans::default();
		let _default =
			tracing::subscriber::set_default(tracing_subscriber::registry().with(spans.clone()));
		let relay = build_reqwest_test_relay("http://127.0.0.1:9/token");
		let request =
			Request::builder().uri(REQUEST_PATH).body(Body::empty()).expect("Request should build.");
		let response = router(relay).oneshot(request).await.expect("Router should answer.");

		assert_eq!(response.status(), StatusCode::FOUND);

		let recorded = spans.0.lock().clone();
		let handler_events: Vec<_> =
			recorded.iter().filter(|(target, _)| target == "oauth2_relay::server").collect();

		assert_eq!(handler_events.len(), 2, "Unexpected handler events: {recorded:?}");
		assert!(handler_events.iter().all(|(_, span)| *span == Some("oauth2_relay.flow")));
	}
}
