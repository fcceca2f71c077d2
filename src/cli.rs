use std::num::NonZeroUsize;

use clap::{Parser, Subcommand};

use crate::config::{parse_api_url, AppConfig, env::ConfigError};

#[derive(Debug, Parser)]
#[command(name = "malurl-scanner", version)]
#[command(about = "Submit URLs to a MalURL scan service and explain its verdicts.")]
pub struct CommandLine {
    /// Base URL of the scan service (overrides SCANNER_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
    /// How many ranked contributions to show (overrides SCANNER_TOP_CONTRIBUTIONS)
    #[arg(long, global = true, value_name = "N")]
    pub top: Option<NonZeroUsize>,
    /// Without a command, reads one URL per line from stdin
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Scan a single URL and exit
    #[command(alias = "s")]
    Scan { url: String },
    /// Show a scan the service already computed
    Show { id: String },
    /// Check that the scan service is reachable
    Health,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(raw) = &self.api_url {
            config.api.base_url = parse_api_url(raw)?;
        }
        if let Some(top) = self.top {
            config.display.top_contributions = top.get();
        }
        config.display.json = self.json;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scan_with_global_flags() {
        let args = CommandLine::try_parse_from([
            "malurl-scanner",
            "scan",
            "http://1.2.3.4/login",
            "--json",
            "--top",
            "3",
        ])
        .unwrap();

        assert!(args.json);
        assert_eq!(args.top.map(NonZeroUsize::get), Some(3));
        match args.command {
            Some(Command::Scan { url }) => assert_eq!(url, "http://1.2.3.4/login"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_top() {
        assert!(CommandLine::try_parse_from(["malurl-scanner", "--top", "0"]).is_err());
    }

    #[test]
    fn no_command_means_interactive() {
        let args = CommandLine::try_parse_from(["malurl-scanner"]).unwrap();
        assert!(args.command.is_none());
    }
}
