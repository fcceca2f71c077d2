mod api;
mod app;
mod cli;
mod config;
mod controller;
mod domain;
mod infrastructure;
mod presenter;
mod session;

use std::process::ExitCode;

use anyhow::Result;
use infrastructure::{directories, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = cli::CommandLine::parse_args();
    let mut config = config::load_config()?;
    args.apply(&mut config)?;

    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::ScannerApp::initialize(config)?;
    app.run(args.command).await
}
