use anvil_core::AnvilClient;
use anvil_desktop::{submit_build_request, Config, HttpTransport};
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().context("loading configuration")?;
    let client = AnvilClient::new(&config.base_url, &config.api_key);
    let transport = HttpTransport::new(config.timeout());

    let body = serde_json::to_string(&config.transaction).context("serializing transaction request")?;
    tracing::info!(base_url = %config.base_url, outputs = config.transaction.outputs.len(), "requesting transaction build");

    // Errors are reported once, by anyhow, when `main` returns.
    let response = submit_build_request(&client, &transport, &body).context("building transaction")?;
    println!("{response}");
    Ok(())
}
