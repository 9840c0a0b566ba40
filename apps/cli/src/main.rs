mod commands;
mod config;
mod main_lib;

use clap::Parser;
use commands::Command;
use config::Config;
use main_lib::{build_context, init_tracing, start_session};

#[derive(Parser, Debug)]
#[command(name = "propshare")]
#[command(about = "Browse properties and trade fractional shares")]
#[command(version)]
struct Cli {
    /// Use the seeded in-memory backend and demo account
    #[arg(long, default_value_t = false)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_format);

    let demo = cli.demo || config.demo;
    let ctx = build_context(&config, demo)?;
    start_session(&ctx, &config, demo).await?;

    let result = commands::run(cli.command, &ctx).await;
    ctx.teardown();
    result
}
