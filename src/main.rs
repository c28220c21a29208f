use clap::Parser;
use tracing_subscriber::EnvFilter;

use netchess::app;
use netchess::config::{Cli, ClientConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(&cli)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    app::run(&config)
}
