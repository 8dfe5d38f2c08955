//! Command-line surface of the `retry` binary.

use std::{str::FromStr, time::Duration};

use clap::Parser;
use retry_cli::RetryConfig;

const EXAMPLES: &str = "\
Examples:
  retry -- ls -lah dir
  retry -n 3 -t 100 -- ls asdf";

#[derive(Parser, Debug)]
#[command(name = "retry", version)]
#[command(about = "Run a command and retry it with exponential backoff until it succeeds")]
#[command(override_usage = "retry [OPTION]... -- [COMMAND]...")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Maximum amount of times to retry the operation
    #[arg(short = 'n', long, value_name = "N", default_value_t = 10)]
    pub retries: u32,

    /// Exponential factor to use
    #[arg(long, value_name = "F", default_value_t = 2.0)]
    pub factor: f64,

    /// Number of milliseconds before starting the first retry
    #[arg(short = 't', long = "min-timeout", value_name = "MS", default_value_t = 1000)]
    pub min_timeout: u64,

    /// Maximum number of milliseconds between two retries [default: Infinity]
    #[arg(long = "max-timeout", value_name = "MS")]
    pub max_timeout: Option<TimeoutCap>,

    /// Randomizes the timeouts by multiplying with a factor between 1 to 2
    #[arg(long)]
    pub randomize: bool,

    /// Log attempts, backoff and signals to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to run, with its arguments
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// Builds the retry configuration from the parsed flags (not yet validated).
    pub fn config(&self) -> RetryConfig {
        RetryConfig {
            retries: self.retries,
            factor: self.factor,
            min_timeout: Duration::from_millis(self.min_timeout),
            max_timeout: match self.max_timeout {
                Some(TimeoutCap::Millis(ms)) => Some(Duration::from_millis(ms)),
                Some(TimeoutCap::Unbounded) | None => None,
            },
            randomize: self.randomize,
        }
    }
}

/// Value of `--max-timeout`: milliseconds, or `Infinity`/`inf` for no cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutCap {
    Unbounded,
    Millis(u64),
}

impl FromStr for TimeoutCap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("infinity") || s.eq_ignore_ascii_case("inf") {
            return Ok(TimeoutCap::Unbounded);
        }
        s.parse::<u64>()
            .map(TimeoutCap::Millis)
            .map_err(|e| format!("expected milliseconds or 'Infinity': {e}"))
    }
}
