use clap::Parser;

use offboard::cli::Cli;
use offboard::config::OffboardConfig;
use offboard::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => OffboardConfig::load_from(path)?,
        None => OffboardConfig::load()?,
    };
    logging::init_logging(&config.log_level, cli.verbose);

    commands::run(cli, config).await
}
