//! Command line and environment surface of the `oauth2-relay` binary.

// std
use std::path::PathBuf;
// crates.io
use clap::Parser;
// self
use crate::{
	config::{ConfigFile, RelayConfig},
	error::ConfigError,
	obs::LogFormat,
};

/// Stateless OAuth 2.0 authorization-code relay.
///
/// Settings are read from an optional JSON file and overridden by flags or environment
/// variables.
#[derive(Debug, Parser)]
#[command(name = "oauth2-relay", version, about, long_about = None)]
pub struct Cli {
	/// JSON configuration file.
	#[arg(long, short, env = "OAUTH2_RELAY_CONFIG")]
	pub config: Option<PathBuf>,
	/// OAuth 2.0 client identifier.
	#[arg(long, env = "OAUTH2_RELAY_CLIENT_ID")]
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret.
	#[arg(long, env = "OAUTH2_RELAY_CLIENT_SECRET", hide_env_values = true)]
	pub client_secret: Option<String>,
	/// Space-separated scopes, not percent-encoded.
	#[arg(long, env = "OAUTH2_RELAY_SCOPE")]
	pub scope: Option<String>,
	/// Callback URL registered with the provider [default: http://localhost:5000/callback].
	#[arg(long, env = "OAUTH2_RELAY_REDIRECT_URI")]
	pub redirect_uri: Option<String>,
	/// Microsoft identity platform tenant [default: common].
	#[arg(long, env = "OAUTH2_RELAY_TENANT")]
	pub tenant: Option<String>,
	/// Explicit authorize endpoint (requires --token-url).
	#[arg(long, env = "OAUTH2_RELAY_AUTHORIZE_URL")]
	pub authorize_url: Option<String>,
	/// Explicit token endpoint (requires --authorize-url).
	#[arg(long, env = "OAUTH2_RELAY_TOKEN_URL")]
	pub token_url: Option<String>,
	/// Address to listen on [default: 0.0.0.0:5000].
	#[arg(long, short, env = "OAUTH2_RELAY_LISTEN")]
	pub listen: Option<String>,
	/// Emit logs as JSON lines.
	#[arg(long, env = "OAUTH2_RELAY_LOG_JSON")]
	pub log_json: bool,
}
impl Cli {
	/// Settings supplied on the command line or through the environment.
	pub fn overrides(&self) -> ConfigFile {
		ConfigFile {
			client_id: self.client_id.clone(),
			client_secret: self.client_secret.clone(),
			scope: self.scope.clone(),
			redirect_uri: self.redirect_uri.clone(),
			tenant: self.tenant.clone(),
			authorize_url: self.authorize_url.clone(),
			token_url: self.token_url.clone(),
			listen: self.listen.clone(),
		}
	}

	/// Loads the optional file layer, applies the overrides, and validates the result.
	pub fn load_config(&self) -> Result<RelayConfig, ConfigError> {
		let base = match &self.config {
			Some(path) => ConfigFile::load(path)?,
			None => ConfigFile::default(),
		};

		base.merge(self.overrides()).into_config()
	}

	/// Log output format selected by `--log-json`.
	pub fn log_format(&self) -> LogFormat {
		if self.log_json { LogFormat::Json } else { LogFormat::Pretty }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use clap::{CommandFactory, FromArgMatches};
	// self
	use super::*;

	// Parses `args` with every environment fallback detached so ambient `OAUTH2_RELAY_*`
	// variables cannot leak into the result.
	fn parse_without_env<const N: usize>(args: [&str; N]) -> Cli {
		let matches = Cli::command()
			.mut_args(|arg| arg.env(None::<&'static str>))
			.try_get_matches_from(args)
			.expect("Flags should parse.");

		Cli::from_arg_matches(&matches).expect("Matches should map onto the CLI.")
	}

	#[test]
	fn flags_become_the_override_layer() {
		let cli = parse_without_env([
			"oauth2-relay",
			"--client-id",
			"cli-client",
			"--client-secret",
			"cli-secret",
			"--scope",
			"openid offline_access",
			"--listen",
			"127.0.0.1:5050",
			"--log-json",
		]);
		let config = cli.load_config().expect("Flags alone should form a valid config.");

		assert_eq!(config.client_id, "cli-client");
		assert_eq!(config.scope.as_str(), "openid offline_access");
		assert_eq!(config.listen.port(), 5050);
		assert_eq!(cli.log_format(), LogFormat::Json);
	}

	#[test]
	fn missing_config_file_is_reported_with_its_path() {
		let cli = parse_without_env(["oauth2-relay", "--config", "/nonexistent/relay.json"]);
		let err = cli.load_config().expect_err("Missing file should fail to load.");

		assert!(matches!(err, ConfigError::ConfigFile { ref path, .. } if path == "/nonexistent/relay.json"));
	}

	#[test]
	fn detached_env_leaves_unset_flags_empty() {
		let cli = parse_without_env(["oauth2-relay"]);

		assert!(cli.config.is_none());
		assert!(cli.token_url.is_none());
		assert_eq!(cli.overrides(), ConfigFile::default());
		assert_eq!(cli.log_format(), LogFormat::Pretty);
	}
}
