use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Endpoint answered with status {0}")]
    Status(u16),
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Overpass aborted the query: {0}")]
    Runtime(String),
}

impl From<ureq::Error> for EndpointError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => EndpointError::Status(status),
            other => EndpointError::Transport(other.to_string()),
        }
    }
}

/// Sends one query to one endpoint and hands back the raw body.
pub trait Transport: Sync {
    fn post_query(&self, endpoint: &str, query: &str) -> Result<String, EndpointError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    agent: Agent,
    max_body_bytes: u64,
}

impl HttpTransport {
    /// `timeout` bounds a whole attempt, connect through the last body byte.
    pub fn new(timeout: Duration, max_body_bytes: u64) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let agent: Agent = config.into();
        HttpTransport {
            agent,
            max_body_bytes,
        }
    }
}

impl Transport for HttpTransport {
    fn post_query(&self, endpoint: &str, query: &str) -> Result<String, EndpointError> {
        let mut response = self.agent.post(endpoint).send(query)?;
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_string()?;
        Ok(body)
    }
}
