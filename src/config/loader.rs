use std::{env, time::Duration};

use url::Url;

use super::env::{
    ApiConfig, AppConfig, ConfigError, DirectoryConfig, DisplayConfig, LoggingConfig,
    DEFAULT_API_URL, DEFAULT_TOP_CONTRIBUTIONS,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_url = get("SCANNER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_api_url(&raw_url)?;
        let timeout = get("SCANNER_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let display = DisplayConfig {
            top_contributions: get("SCANNER_TOP_CONTRIBUTIONS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_TOP_CONTRIBUTIONS),
            json: false,
        };

        let directories = DirectoryConfig {
            logs_dir: get("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            display,
            directories,
            logging,
        })
    }
}

/// Parses the scan service base URL. A trailing slash is added so relative
/// endpoint paths resolve underneath any path prefix.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidApiUrl {
        value: trimmed.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
