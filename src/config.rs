//! Runtime configuration
//!
//! Every setting can come from the command line or from a `CLUB_*` environment variable.

use clap::Parser;
use std::net::SocketAddr;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "club-membership",
    about = "Administrative backend for sports-club memberships",
    version
)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "CLUB_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Log filter directive, e.g. `info` or `rust_club_membership_service=debug`
    ///
    /// Takes precedence over `-v`.
    #[arg(long, env = "CLUB_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn log_filter(&self) -> String {
        if let Some(log_level) = &self.log_level {
            return log_level.clone();
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use speculoos::prelude::*;

    #[rstest]
    #[case(&["club"], "info")]
    #[case(&["club", "-v"], "debug")]
    #[case(&["club", "-vvv"], "trace")]
    #[case(&["club", "-v", "--log-level", "warn"], "warn")]
    fn test_log_filter(#[case] args: &[&str], #[case] expected: &str) {
        let config = Config::try_parse_from(args.iter().copied()).unwrap();
        assert_that!(config.log_filter().as_str()).is_equal_to(expected);
    }

    #[test]
    fn test_bind_address() {
        let config = Config::try_parse_from(["club", "--bind", "127.0.0.1:8080"]).unwrap();
        assert_that!(config.bind.port()).is_equal_to(8080);
    }

    #[test]
    fn test_invalid_bind_address() {
        let res = Config::try_parse_from(["club", "--bind", "localhost"]);
        assert_that!(res).is_err();
    }
}
