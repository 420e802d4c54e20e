//! Provider-facing descriptors.
//!
//! A [`ProviderDescriptor`] names the two endpoints the relay talks to: the authorize
//! endpoint browsers are redirected to and the token endpoint the callback POSTs the
//! authorization code to. Descriptors are validated once through
//! [`ProviderDescriptorBuilder`] and are immutable afterwards.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

const MICROSOFT_LOGIN_HOST: &str = "https://login.microsoftonline.com";

/// Tenant segment used by the Microsoft identity platform for multi-tenant apps.
pub const MICROSOFT_DEFAULT_TENANT: &str = "common";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
}

/// Immutable provider descriptor consumed by the relay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Descriptor for the Microsoft identity platform (v2.0 endpoints) under `tenant`.
	///
	/// Pass [`MICROSOFT_DEFAULT_TENANT`] for apps that accept both work and personal accounts.
	pub fn microsoft(tenant: &str) -> Result<Self, ConfigError> {
		let base = format!("{MICROSOFT_LOGIN_HOST}/{tenant}/oauth2/v2.0");
		let authorization = Url::parse(&format!("{base}/authorize"))
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token = Url::parse(&format!("{base}/token"))
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;

		Ok(Self::builder().authorization_endpoint(authorization).token_endpoint(token).build()?)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn microsoft_preset_targets_the_v2_endpoints() {
		let descriptor = ProviderDescriptor::microsoft(MICROSOFT_DEFAULT_TENANT)
			.expect("Microsoft descriptor should build for the common tenant.");

		assert_eq!(
			descriptor.endpoints.authorization.as_str(),
			"https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
		);
		assert_eq!(
			descriptor.endpoints.token.as_str(),
			"https://login.microsoftonline.com/common/oauth2/v2.0/token"
		);
	}

	#[test]
	fn microsoft_preset_rejects_tenants_that_inject_a_query() {
		let err = ProviderDescriptor::microsoft("common?x=1")
			.expect_err("A tenant carrying a query string should not build.");

		assert!(matches!(
			err,
			ConfigError::InvalidDescriptor(ProviderDescriptorError::EndpointHasQuery { .. })
		));
	}
}
