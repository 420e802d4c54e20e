//! A stateless OAuth 2.0 authorization-code relay: redirect the browser to the provider,
//! trade the returned code at the token endpoint, and echo the raw token response.
//!
//! There is no session storage, token cache, state validation, or refresh logic. Every
//! request stands alone and only reads the [`config::RelayConfig`] built at startup.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod server;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use reqwest::redirect::Policy;
	// self
	use crate::{
		config::{RelayConfig, Scope},
		flows::ReqwestRelay,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderDescriptor,
	};

	/// Client identifier used by test configurations.
	pub const TEST_CLIENT_ID: &str = "78f1ffae-test-client";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_SECRET: &str = "test-secret~with.special=chars&more";
	/// Scope string used by test configurations.
	pub const TEST_SCOPE: &str = "openid offline_access mail.read mail.send";
	/// Redirect URI used by test configurations.
	pub const TEST_REDIRECT_URI: &str = "http://localhost:5000/callback";

	/// Builds a configuration pointing at the provided endpoints.
	pub fn test_config(authorize_endpoint: &str, token_endpoint: &str) -> RelayConfig {
		let descriptor = ProviderDescriptor::builder()
			.authorization_endpoint(
				Url::parse(authorize_endpoint).expect("Test authorize endpoint should parse."),
			)
			.token_endpoint(Url::parse(token_endpoint).expect("Test token endpoint should parse."))
			.build()
			.expect("Test descriptor should validate.");

		RelayConfig::new(
			descriptor,
			TEST_CLIENT_ID,
			TEST_CLIENT_SECRET,
			Scope::new(TEST_SCOPE).expect("Test scope should validate."),
			Url::parse(TEST_REDIRECT_URI).expect("Test redirect URI should parse."),
		)
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests. Redirects stay disabled, as in [`ReqwestHttpClient::new`].
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a reqwest-backed relay whose token endpoint is `token_endpoint`.
	pub fn build_reqwest_test_relay(token_endpoint: &str) -> ReqwestRelay {
		ReqwestRelay::with_http_client(
			test_config("https://login.example.com/authorize", token_endpoint),
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use axum;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
use color_eyre as _;
#[cfg(test)] use {http_body_util as _, httpmock as _, tower as _};
