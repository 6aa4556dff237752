//! Command-line argument definitions.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use linkvet_core::CheckerConfig;

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colored statuses.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Validate HTTP(S) links in documentation and data files.
#[derive(Debug, Parser)]
#[command(name = "linkvet", version, about)]
pub struct Cli {
    /// Files or directories to scan.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of URLs checked concurrently.
    #[arg(long, default_value_t = 50)]
    pub concurrency: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Additional attempts after a transport failure.
    #[arg(long, default_value_t = 1)]
    pub retries: usize,

    /// Maximum redirect chain length.
    #[arg(long, default_value_t = 10)]
    pub max_redirects: usize,

    /// Override the User-Agent header.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Abort the run on malformed input files instead of skipping them.
    #[arg(long)]
    pub strict: bool,

    /// Treat 403 (Blocked) results as failures.
    #[arg(long)]
    pub fail_on_blocked: bool,

    /// Report output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Ignore URLs on this host (and its subdomains). Repeatable.
    #[arg(long = "ignore-host", value_name = "HOST")]
    pub ignore_hosts: Vec<String>,

    /// Ignore URLs matching this glob. Repeatable.
    #[arg(long = "ignore-glob", value_name = "GLOB")]
    pub ignore_globs: Vec<String>,

    /// Ignore URLs matching this regex. Repeatable.
    #[arg(long = "ignore-regex", value_name = "REGEX")]
    pub ignore_regexes: Vec<String>,

    /// Only report warnings and failures.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the checker configuration from the parsed flags.
    #[must_use]
    pub fn checker_config(&self) -> CheckerConfig {
        let defaults = CheckerConfig::default();
        CheckerConfig {
            concurrency: self.concurrency.max(1),
            timeout_per_request: Duration::from_secs(self.timeout.max(1)),
            max_retries: self.retries,
            max_redirects: self.max_redirects,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["linkvet", "docs/"]);
        assert_eq!(cli.concurrency, 50);
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.retries, 1);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.strict);
    }

    #[test]
    fn test_checker_config_mapping() {
        let cli = Cli::parse_from([
            "linkvet",
            "--concurrency",
            "8",
            "--timeout",
            "2",
            "--retries",
            "3",
            "--user-agent",
            "custom/1.0",
            "docs/",
        ]);
        let config = cli.checker_config();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.timeout_per_request, Duration::from_secs(2));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.user_agent, "custom/1.0");
    }

    #[test]
    fn test_repeatable_ignore_rules() {
        let cli = Cli::parse_from([
            "linkvet",
            "--ignore-host",
            "a.test",
            "--ignore-host",
            "b.test",
            "--ignore-glob",
            "https://c.test/*",
            "docs/",
        ]);
        assert_eq!(cli.ignore_hosts, vec!["a.test", "b.test"]);
        assert_eq!(cli.ignore_globs.len(), 1);
    }
}
