use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use reqwest::Client;

use crate::{
    api::ScanClient,
    cli::Command,
    config::AppConfig,
    controller::SubmissionController,
    domain::ScanResult,
    session::{write_result, Session},
};

pub struct ScannerApp {
    config: AppConfig,
    client: ScanClient,
}

impl ScannerApp {
    pub fn initialize(config: AppConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("malurl-scanner/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        let client = ScanClient::new(http, config.api.clone());

        tracing::info!(
            target: "api",
            base_url = %config.api.base_url,
            timeout = ?config.api.timeout,
            "scan client ready"
        );
        Ok(Self { config, client })
    }

    pub async fn run(self, command: Option<Command>) -> Result<ExitCode> {
        let ScannerApp { config, client } = self;

        match command {
            None => {
                let controller = Arc::new(SubmissionController::new(client));
                Session::new(controller, config.display).run().await?;
                Ok(ExitCode::SUCCESS)
            }
            Some(Command::Scan { url }) => {
                let controller = SubmissionController::new(client);
                controller.submit_url(url).await;
                let state = controller.snapshot();
                let result = state.result().context("scan finished without a result")?;
                emit(result, &config)
            }
            Some(Command::Show { id }) => {
                let result = match client.fetch(&id).await {
                    Ok(result) => result,
                    Err(err) => {
                        tracing::warn!(target: "api", error = %err, scan_id = %id, "lookup failed");
                        ScanResult::client_failure(err.to_string())
                    }
                };
                emit(&result, &config)
            }
            Some(Command::Health) => match client.health().await {
                Ok(health) => {
                    println!("{} {}", client.base_url(), health.status);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{} unreachable: {err:#}", client.base_url());
                    Ok(ExitCode::FAILURE)
                }
            },
        }
    }
}

fn emit(result: &ScanResult, config: &AppConfig) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    write_result(result, &config.display, &mut stdout)?;
    stdout.flush()?;
    Ok(match result.error() {
        Some(error) => {
            tracing::warn!(target: "api", error, "scan failed");
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    })
}
