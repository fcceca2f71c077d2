use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::{
    config::ApiConfig,
    domain::{ScanRequest, ScanResult},
};

use super::wire::{decode_scan_response, HealthStatus, HEALTH_PATH, SCAN_PATH};

// `Err` means the transport failed; whatever the service answered is a ScanResult.
#[async_trait]
pub trait ScanService: Send + Sync {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanResult>;
}

#[derive(Clone)]
pub struct ScanClient {
    http: Client,
    config: ApiConfig,
}

impl ScanClient {
    pub fn new(http: Client, config: ApiConfig) -> Self {
        Self { http, config }
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    pub async fn fetch(&self, scan_id: &str) -> Result<ScanResult> {
        let mut url = self.endpoint(SCAN_PATH)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("scan service URL cannot take a path segment"))?
            .push(scan_id);

        tracing::debug!(target: "api", %url, "fetching stored scan");
        let response = self.with_timeout(self.http.get(url)).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(decode_scan_response(status, &body))
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(HEALTH_PATH)?;
        let status = self
            .with_timeout(self.http.get(url.clone()))
            .send()
            .await?
            .error_for_status()?
            .json::<HealthStatus>()
            .await
            .with_context(|| format!("unexpected health response from {url}"))?;
        Ok(status)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.config
            .base_url
            .join(path)
            .with_context(|| format!("failed to resolve {path} against {}", self.config.base_url))
    }

    fn with_timeout(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }
}

#[async_trait]
impl ScanService for ScanClient {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanResult> {
        let url = self.endpoint(SCAN_PATH)?;
        tracing::debug!(target: "api", %url, target_url = %request.url, "submitting scan");

        let response = self
            .with_timeout(self.http.post(url))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        let result = decode_scan_response(status, &body);
        tracing::info!(
            target: "api",
            status = status.as_u16(),
            failed = result.is_failure(),
            "scan response received"
        );
        Ok(result)
    }
}
