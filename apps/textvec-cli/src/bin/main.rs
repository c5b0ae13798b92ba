use std::io;

use textvec_core::config::Config;
use textvec_embed::{get_default_embedder, ModelSpec};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for the embedding record.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let spec = ModelSpec::from_config(&config);
    debug!(model = %spec.id, max_len = spec.max_len, "resolved model spec");

    let embedder = get_default_embedder(&spec)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    textvec_cli::run(stdin.lock(), stdout.lock(), embedder.as_ref())
}
