//! Relay-level error types shared across configuration, flows, and the HTTP surface.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
///
/// Provider-reported OAuth errors (`invalid_grant`, `invalid_client`, ...) are deliberately
/// absent: the relay hands those bodies back verbatim with status 200.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Callback request arrived without a `code` query parameter.
	#[error("Callback request is missing the authorization code.")]
	MissingCode,
}
impl Error {
	/// HTTP status code the relay answers with for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::MissingCode => 401,
			Self::Config(_) | Self::Transport(_) => 500,
		}
	}
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor is invalid.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// An endpoint URL cannot be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configured scope string is invalid.
	#[error("Configured scope is invalid.")]
	InvalidScope(#[from] crate::config::ScopeValidationError),
	/// Listen address cannot be parsed.
	#[error("Listen address `{value}` is invalid.")]
	InvalidListenAddr {
		/// Raw value supplied by the operator.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: std::net::AddrParseError,
	},
	/// Required setting was not supplied by any source.
	#[error("Missing required setting `{field}`.")]
	MissingField {
		/// Setting name.
		field: &'static str,
	},
	/// Configuration file could not be read.
	#[error("Configuration file `{path}` could not be read.")]
	ConfigFile {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration file contains malformed JSON.
	#[error("Configuration file `{path}` is malformed at `{}`.", .source.path())]
	ConfigParse {
		/// Path that failed to parse.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint did not answer within the transport's timeout.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout {
		/// HTTP status code, when the timeout hit after headers arrived.
		status: Option<u16>,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure that carries only a message.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
