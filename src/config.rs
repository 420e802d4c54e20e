//! Relay configuration: the OAuth client identity plus the provider it talks to.
//!
//! [`RelayConfig`] is assembled once at startup and never mutated. Operators feed it
//! through [`ConfigFile`] layers (an optional JSON file overlaid by CLI flags and
//! environment variables) which [`ConfigFile::into_config`] validates in one pass.

mod scope;
mod secret;

pub use scope::*;
pub use secret::*;

// std
use std::{
	fs,
	net::{Ipv4Addr, SocketAddr, SocketAddrV4},
	path::Path,
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	provider::{MICROSOFT_DEFAULT_TENANT, ProviderDescriptor},
};

/// Port the relay listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5000;
/// Redirect URI registered for a relay running on the default port.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/callback";

/// Immutable configuration shared by both relay handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
	/// Provider descriptor naming the authorize and token endpoints.
	pub descriptor: ProviderDescriptor,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Confidential client secret sent in the token request body.
	pub client_secret: ClientSecret,
	/// Space-separated scope string requested during authorization.
	pub scope: Scope,
	/// Callback URL registered with the provider.
	pub redirect_uri: Url,
	/// Socket address the HTTP server binds to.
	pub listen: SocketAddr,
}
impl RelayConfig {
	/// Creates a configuration bound to the default listen address.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		scope: Scope,
		redirect_uri: Url,
	) -> Self {
		Self {
			descriptor,
			client_id: client_id.into(),
			client_secret: ClientSecret::new(client_secret),
			scope,
			redirect_uri,
			listen: default_listen(),
		}
	}

	/// Overrides the listen address.
	pub fn with_listen(mut self, listen: SocketAddr) -> Self {
		self.listen = listen;

		self
	}
}

/// One layer of raw, unvalidated settings.
///
/// Layers come from a JSON file or from the command line and are combined with
/// [`ConfigFile::merge`]; fields set in the overlay win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
	/// OAuth 2.0 client identifier.
	pub client_id: Option<String>,
	/// Confidential client secret.
	pub client_secret: Option<String>,
	/// Space-separated scope string.
	pub scope: Option<String>,
	/// Callback URL registered with the provider.
	pub redirect_uri: Option<String>,
	/// Microsoft identity platform tenant used when no explicit endpoints are set.
	pub tenant: Option<String>,
	/// Explicit authorization endpoint.
	pub authorize_url: Option<String>,
	/// Explicit token endpoint.
	pub token_url: Option<String>,
	/// Socket address to bind, e.g. `0.0.0.0:5000`.
	pub listen: Option<String>,
}
impl ConfigFile {
	/// Reads and parses a JSON configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path).map_err(|source| ConfigError::ConfigFile {
			path: path.display().to_string(),
			source,
		})?;

		Self::from_json_str(&path.display().to_string(), &raw)
	}

	/// Parses JSON settings; `origin` labels the source in error messages.
	pub fn from_json_str(origin: &str, raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::ConfigParse { path: origin.to_owned(), source })
	}

	/// Overlays `other` on top of `self`; every field set in `other` wins.
	pub fn merge(self, other: ConfigFile) -> Self {
		Self {
			client_id: other.client_id.or(self.client_id),
			client_secret: other.client_secret.or(self.client_secret),
			scope: other.scope.or(self.scope),
			redirect_uri: other.redirect_uri.or(self.redirect_uri),
			tenant: other.tenant.or(self.tenant),
			authorize_url: other.authorize_url.or(self.authorize_url),
			token_url: other.token_url.or(self.token_url),
			listen: other.listen.or(self.listen),
		}
	}

	/// Validates the merged settings and produces the final [`RelayConfig`].
	pub fn into_config(self) -> Result<RelayConfig, ConfigError> {
		let descriptor = self.descriptor()?;
		let client_id = required("client_id", self.client_id)?;
		let client_secret = required("client_secret", self.client_secret)?;
		let scope = Scope::new(required("scope", self.scope)?)?;
		let redirect_uri = Url::parse(self.redirect_uri.as_deref().unwrap_or(DEFAULT_REDIRECT_URI))
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let listen = match self.listen {
			Some(value) => value
				.parse()
				.map_err(|source| ConfigError::InvalidListenAddr { value, source })?,
			None => default_listen(),
		};

		Ok(RelayConfig::new(descriptor, client_id, client_secret, scope, redirect_uri)
			.with_listen(listen))
	}

	fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		if self.authorize_url.is_none() && self.token_url.is_none() {
			return ProviderDescriptor::microsoft(
				self.tenant.as_deref().unwrap_or(MICROSOFT_DEFAULT_TENANT),
			);
		}

		let mut builder = ProviderDescriptor::builder();

		if let Some(raw) = &self.authorize_url {
			builder = builder.authorization_endpoint(parse_endpoint("authorization", raw)?);
		}
		if let Some(raw) = &self.token_url {
			builder = builder.token_endpoint(parse_endpoint("token", raw)?);
		}

		Ok(builder.build()?)
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	value.filter(|v| !v.is_empty()).ok_or(ConfigError::MissingField { field })
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
}

fn default_listen() -> SocketAddr {
	SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}
