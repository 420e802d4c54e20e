// crates.io
use url::Url;
// self
use oauth2_relay::{
	config::ConfigFile,
	error::ConfigError,
	provider::{ProviderDescriptor, ProviderDescriptorBuilder, ProviderDescriptorError},
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse descriptor test URL.")
}

fn builder(authorize: &str, token: &str) -> ProviderDescriptorBuilder {
	ProviderDescriptor::builder().authorization_endpoint(url(authorize)).token_endpoint(url(token))
}

#[test]
fn descriptor_rejects_insecure_remote_endpoints() {
	let err = builder("http://idp.example.com/authorize", "https://idp.example.com/token")
		.build()
		.expect_err("Plain HTTP authorize endpoint should be rejected.");

	assert_eq!(
		err,
		ProviderDescriptorError::InsecureEndpoint {
			endpoint: "authorization",
			url: "http://idp.example.com/authorize".into(),
		}
	);

	let err = builder("https://idp.example.com/authorize", "http://idp.example.com/token")
		.build()
		.expect_err("Plain HTTP token endpoint should be rejected.");

	assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));
	assert_eq!(err.to_string(), "The token endpoint must use HTTPS: http://idp.example.com/token.");
}

#[test]
fn descriptor_rejects_endpoints_with_query_or_fragment() {
	let err = builder("https://idp.example.com/authorize?prompt=login", "https://idp.example.com/token")
		.build()
		.expect_err("Authorize endpoint with a query should be rejected.");

	assert!(matches!(
		err,
		ProviderDescriptorError::EndpointHasQuery { endpoint: "authorization", .. }
	));

	let err = builder("https://idp.example.com/authorize", "https://idp.example.com/token#frag")
		.build()
		.expect_err("Token endpoint with a fragment should be rejected.");

	assert!(matches!(err, ProviderDescriptorError::EndpointHasQuery { endpoint: "token", .. }));
}

#[test]
fn explicit_endpoints_replace_the_microsoft_preset() {
	let config = ConfigFile::from_json_str(
		"inline",
		r#"{
			"client_id": "client",
			"client_secret": "secret",
			"scope": "openid",
			"tenant": "ignored-when-urls-are-set",
			"authorize_url": "https://idp.example.com/oauth2/authorize",
			"token_url": "https://idp.example.com/oauth2/token"
		}"#,
	)
	.expect("Inline JSON should parse.")
	.into_config()
	.expect("Explicit endpoints should validate.");

	assert_eq!(config.descriptor.endpoints.authorization.host_str(), Some("idp.example.com"));
	assert_eq!(config.descriptor.endpoints.token.path(), "/oauth2/token");
}

#[test]
fn malformed_endpoint_urls_name_the_endpoint() {
	let err = ConfigFile {
		client_id: Some("client".into()),
		client_secret: Some("secret".into()),
		scope: Some("openid".into()),
		authorize_url: Some("https://idp.example.com/authorize".into()),
		token_url: Some("not a url".into()),
		..Default::default()
	}
	.into_config()
	.expect_err("Unparsable token URL should fail validation.");

	assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "token", .. }));
}
