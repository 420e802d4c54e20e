//! `oauth2-relay` binary: load settings, install logging, serve until a shutdown signal.

// crates.io
use clap::Parser;
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use oauth2_relay::{
	cli::Cli,
	flows::ReqwestRelay,
	obs,
	server::{self, shutdown_signal},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	obs::init_subscriber(cli.log_format())?;

	let config = cli.load_config()?;
	let listener = TcpListener::bind(config.listen).await?;

	tracing::info!(
		client_id = %config.client_id,
		scope = %config.scope,
		redirect_uri = %config.redirect_uri,
		"Relay configured."
	);

	let relay = ReqwestRelay::new(config)?;

	server::serve(relay, listener, shutdown_signal()).await?;

	Ok(())
}
