//! The two relay flows: sending the browser to the provider and trading the code it
//! returns for the provider's raw token response.

pub mod authorize;
pub mod exchange;

pub use authorize::*;
pub use exchange::*;

// self
use crate::{_prelude::*, config::RelayConfig, http::TokenHttpClient, oauth::TransportErrorMapper};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Relay specialized for the crate's default reqwest transport stack.
pub type ReqwestRelay = Relay<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Stateless coordinator shared by every inbound request.
///
/// The relay owns the read-only configuration and the outbound HTTP client. Cloning is
/// cheap (three `Arc`s) and nothing inside is ever mutated, so concurrent handlers need
/// no synchronization.
pub struct Relay<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for the token exchange.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Client identity and provider endpoints.
	pub config: Arc<RelayConfig>,
}
impl<C, M> Relay<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a relay that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: impl Into<Arc<RelayConfig>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config: config.into(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Relay<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a relay backed by a fresh reqwest client.
	pub fn new(config: impl Into<Arc<RelayConfig>>) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(config, http_client, ReqwestTransportErrorMapper))
	}
}
impl<C, M> Clone for Relay<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			config: Arc::clone(&self.config),
		}
	}
}
impl<C, M> Debug for Relay<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay").field("config", &self.config).finish()
	}
}
