//! Authorize URL construction for the redirect leg.

// self
use crate::{
	_prelude::*,
	config::RelayConfig,
	flows::Relay,
	http::TokenHttpClient,
	obs::{FlowKind, FlowSpan},
	oauth::TransportErrorMapper,
};

/// `state` value sent with every authorization request.
///
/// The relay keeps no sessions, so the value is a constant and is never checked on the
/// callback. This leaves the flow without CSRF protection; deployments that need it must
/// put a stateful layer in front of the relay.
pub const AUTHORIZE_STATE: &str = "12345";
/// `response_type` requesting an authorization code.
pub const RESPONSE_TYPE: &str = "code";
/// `response_mode` asking the provider to return the code in the callback query string.
pub const RESPONSE_MODE: &str = "query";

impl<C, M> Relay<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the provider authorize URL users are redirected to.
	pub fn authorize_url(&self) -> Url {
		let _guard = FlowSpan::new(FlowKind::Redirect, "authorize_url").entered();

		build_authorize_url(&self.config)
	}
}

/// Appends the authorization request parameters to the configured authorize endpoint.
///
/// Every value is form-encoded exactly once here, which is why [`crate::config::Scope`]
/// refuses pre-encoded input.
pub fn build_authorize_url(config: &RelayConfig) -> Url {
	let mut url = config.descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_id", &config.client_id);
	pairs.append_pair("response_type", RESPONSE_TYPE);
	pairs.append_pair("redirect_uri", config.redirect_uri.as_str());
	pairs.append_pair("response_mode", RESPONSE_MODE);
	pairs.append_pair("scope", config.scope.as_str());
	pairs.append_pair("state", AUTHORIZE_STATE);

	drop(pairs);

	url
}
