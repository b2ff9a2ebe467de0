use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// How long to wait for the metrics endpoint before giving up.
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
    #[error("failed to scrape metrics")]
    Transport(#[source] reqwest::Error),
    #[error("invalid status code from server: {0}")]
    Status(u16),
    #[error("couldn't read the body of the response")]
    Read(#[source] reqwest::Error),
}

pub type ScrapeResult = std::result::Result<String, ScrapeError>;

pub struct ScrapeTarget {
    /// The url to be scraped.
    ///
    /// e.g. https://awx.example.com/api/v2/metrics/
    pub url: String,

    /// Sent as a bearer token with the request
    api_token: String,
}

impl ScrapeTarget {
    /// Targets the metrics api of an AWX (or Ansible Tower) server, given its host name.
    pub fn new(server_url: &str, api_token: String) -> Self {
        ScrapeTarget {
            url: format!("https://{}/api/v2/metrics/", server_url),
            api_token,
        }
    }

    /// Make a request to the scrape target and return the response body.
    ///
    /// The server's certificate is not verified.
    pub fn scrape(&self, timeout: Duration) -> ScrapeResult {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(ScrapeError::Client)?;
        let response = client
            .get(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .send()
            .map_err(ScrapeError::Transport)?;
        if response.status() != StatusCode::OK {
            return Err(ScrapeError::Status(response.status().as_u16()));
        }
        response.text().map_err(ScrapeError::Read)
    }
}
