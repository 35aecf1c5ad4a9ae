//! CLI argument parsing

use clap::Parser;
use dhcpfind_core::{Error, Result};
use std::time::Duration;

/// Default time to wait for OFFERs, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "find-dhcp-servers")]
#[command(
    version,
    about = "Find DHCP servers answering on the local network",
    long_about = "Broadcasts one DHCP DISCOVER and prints every OFFER received, \
                  one block per server, including the decoded options. Useful for \
                  spotting rogue DHCP servers."
)]
pub struct Cli {
    /// Network interface to probe (default: first up, non-loopback interface)
    #[arg(value_name = "INTERFACE")]
    pub interface: Option<String>,

    /// Ring the terminal bell for every server found
    #[arg(short = 'a', long)]
    pub audible: bool,

    /// Ask servers to broadcast their replies
    #[arg(short = 'b', long)]
    pub broadcast: bool,

    /// Stop after this many servers answered
    #[arg(short = 'c', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_responses: Option<u32>,

    /// Exit with failure if fewer servers answered
    #[arg(short = 'm', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub min_responses: Option<u32>,

    /// Seconds to wait for responses (0 waits until interrupted)
    #[arg(short = 't', long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Accept responses with bad IP or UDP checksums
    #[arg(short = 'i', long)]
    pub ignore_checksums: bool,

    /// Print nothing but errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List interfaces and exit
    #[arg(short = 'l', long)]
    pub list_interfaces: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_responses, self.max_responses) {
            if min > max {
                return Err(Error::invalid_parameter(
                    "min-responses".to_string(),
                    format!("{} exceeds max-responses {}", min, max),
                ));
            }
        }
        Ok(())
    }

    /// Log filter directive used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// How long to listen; `None` means until interrupted
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}
