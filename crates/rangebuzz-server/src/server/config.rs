use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use rangebuzz::EvaluatorConfig;

/// Runtime configuration for the `rangebuzz-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is honored), with defaults matching the documented service
/// behavior: port 3000, a 1000-permit pool, a 1 second per-request deadline
/// and a 5 second shutdown grace period.
///
/// The classification rule and the maximum range size are fixed and are not
/// configurable.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rangebuzz-server",
    version,
    about = "An HTTP service classifying integer ranges as Fizz, Buzz and FizzBuzz"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:3000"))]
    pub server_addr: String,

    /// Capacity of the permit pool gating simultaneous element computations.
    ///
    /// Shared across all in-flight requests. Since a single request spans at
    /// most 100 elements, values above that only matter under concurrent
    /// load.
    ///
    /// Environment variable: `MAX_CONCURRENCY`
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = rangebuzz::DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Per-request deadline in milliseconds.
    ///
    /// Elements not started before the deadline are left empty in the
    /// response rather than failing the request.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 1000)]
    pub request_timeout_ms: u64,

    /// Seconds in-flight requests are given to finish after a shutdown signal
    /// before the server is forced down.
    ///
    /// Environment variable: `SHUTDOWN_GRACE_SECS`
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub max_concurrency: usize,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// The evaluator settings derived from this configuration.
    pub const fn evaluator(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            max_concurrency: self.max_concurrency,
            timeout: self.request_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let evaluator = EvaluatorConfig::default();
        Self {
            server_addr: String::from("0.0.0.0:3000"),
            max_concurrency: evaluator.max_concurrency,
            request_timeout: evaluator.timeout,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_concurrency == 0 {
            bail!("MAX_CONCURRENCY must be greater than 0");
        }

        if args.request_timeout_ms == 0 {
            bail!("REQUEST_TIMEOUT_MS must be greater than 0");
        }

        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        Ok(Self {
            server_addr: args.server_addr,
            max_concurrency: args.max_concurrency,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let argv = core::iter::once("rangebuzz-server").chain(args.iter().copied());
        ServerConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = parse(&[
            "--server-addr",
            "127.0.0.1:8080",
            "--max-concurrency",
            "16",
            "--request-timeout-ms",
            "250",
            "--shutdown-grace-secs",
            "1",
        ])
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.max_concurrency, 16);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.shutdown_grace, Duration::from_secs(1));
        assert_eq!(
            config.evaluator(),
            EvaluatorConfig {
                max_concurrency: 16,
                timeout: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = parse(&["--max-concurrency", "0"]).unwrap_err();
        assert!(err.to_string().contains("MAX_CONCURRENCY"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = parse(&["--request-timeout-ms", "0"]).unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_MS"));
    }

    #[test]
    fn rejects_empty_address() {
        let err = parse(&["--server-addr", " "]).unwrap_err();
        assert!(err.to_string().contains("SERVER_ADDR"));
    }

    #[test]
    fn default_matches_evaluator_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.evaluator(), EvaluatorConfig::default());
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
    }
}
