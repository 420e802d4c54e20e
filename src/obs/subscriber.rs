// crates.io
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Filter applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "oauth2_relay=info,tower_http=info";

/// Output format of the process-wide log stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
	/// Human-readable lines.
	#[default]
	Pretty,
	/// One JSON object per event.
	Json,
}

/// Installs the global `tracing` subscriber.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]. Fails if a global
/// subscriber is already installed.
pub fn init_subscriber(format: LogFormat) -> Result<(), TryInitError> {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
	let registry = tracing_subscriber::registry().with(filter);

	match format {
		LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
		LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
	}
}
