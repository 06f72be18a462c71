mod cli;

use anyhow::Result;
use circleci_actions::output;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting circleci-actions");
    cli.execute().await?;

    Ok(())
}
