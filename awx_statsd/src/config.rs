use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;
use thiserror::Error;

use awx_prometheus::statsd::DEFAULT_PREFIX;

/// Used when `--server-url` isn't given
pub const DEFAULT_SERVER_URL: &str = "localhost";

pub const USAGE: &str =
    "Usage: ./awx-statsd --api-token={} --format={} --server-url={}";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("there was no API token provided; an AWX API token is required")]
    MissingApiToken,
    #[error("invalid STATSD_TRANSPORT {0:?} (expected \"udp\" or \"tcp\")")]
    InvalidTransport(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "udp" => Ok(Transport::Udp),
            "tcp" => Ok(Transport::Tcp),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    /// Bearer token for the AWX api
    pub api_token: String,

    /// Host (and optionally port) of the AWX server, e.g. "awx.example.com"
    pub server_url: String,

    /// Accepted for compatibility with older invocations; not used.
    pub format: Option<String>,

    /// Address of the local StatsD listener
    pub statsd_addr: String,

    pub statsd_transport: Transport,

    /// Prepended to every metric name
    pub prefix: String,

    /// File that log output is appended to, in addition to stderr
    pub log_file: Option<PathBuf>,

    /// Enables debug logging, including the causes of errors
    pub debug: bool,

    /// Exit with a non-zero status when the config is incomplete or the scrape fails
    pub strict: bool,
}

impl Config {
    /// Validates the options loaded from arguments and environment variables
    pub fn from_env(env: Environment) -> Result<Config, ConfigError> {
        let api_token = match env.api_token {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(ConfigError::MissingApiToken),
        };
        Ok(Config {
            api_token,
            server_url: env.server_url,
            format: env.format,
            statsd_addr: env.statsd_addr,
            statsd_transport: env.statsd_transport,
            prefix: env.prefix,
            log_file: Some(env.log_file)
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            debug: env.debug,
            strict: env.strict,
        })
    }

    pub fn uses_default_server(&self) -> bool {
        self.server_url == DEFAULT_SERVER_URL
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "awx-statsd")]
pub struct Environment {
    /// API token for the AWX (or Ansible Tower) server
    #[structopt(long, env = "AWX_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Host name of the AWX server
    #[structopt(long, env = "AWX_SERVER_URL", default_value = "localhost")]
    server_url: String,

    /// Output format (unused)
    #[structopt(long, env = "AWX_FORMAT")]
    format: Option<String>,

    /// Address of the StatsD listener to forward metrics to
    #[structopt(long, env = "STATSD_ADDR", default_value = "127.0.0.1:18125")]
    statsd_addr: String,

    /// One of "udp" or "tcp"
    #[structopt(long, env = "STATSD_TRANSPORT", default_value = "udp")]
    statsd_transport: Transport,

    /// Prefix for every forwarded metric name
    #[structopt(long, env = "STATSD_PREFIX", default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Append log output to this file; set to "" to only log to stderr
    #[structopt(long, env = "LOG_FILE", default_value = "/tmp/awx-statsd.log")]
    log_file: String,

    /// Enables debug logging
    #[structopt(short, long)]
    debug: bool,

    /// Exit with a failure status when the config is incomplete or the scrape fails
    #[structopt(long)]
    pub strict: bool,
}

impl Environment {
    /// Loads options from arguments, env and dotenv
    pub fn load() -> Environment {
        // Attempts to find a `.env` file to initialize/extend the environment
        dotenv::dotenv().ok();

        Environment::from_args()
    }
}
