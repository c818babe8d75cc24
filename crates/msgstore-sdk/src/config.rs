use std::time::Duration;

use crate::errors::{MessageStoreError, MessageStoreResult};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
/// Request deadline used when none is configured, or when zero is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const HOST_ENV: &str = "MSGSTORE_HOST";
pub const PORT_ENV: &str = "MSGSTORE_PORT";
pub const TIMEOUT_MS_ENV: &str = "MSGSTORE_TIMEOUT_MS";

/// Where the store lives and how long a single request may take.
///
/// `timeout` bounds one whole request/response cycle. It is not a retry budget.
/// For long-polling it must exceed the poll duration, otherwise the client gives
/// up before the store answers with "no content".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Option<Duration>,
}

pub type ProducerConfig = ClientConfig;
pub type ConsumerConfig = ClientConfig;
pub type PollingConsumerConfig = ClientConfig;

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn effective_timeout(&self) -> Duration {
        self.timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Reads `MSGSTORE_HOST`, `MSGSTORE_PORT` and `MSGSTORE_TIMEOUT_MS`.
    pub fn from_env() -> MessageStoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> MessageStoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(host) = read(HOST_ENV) {
            config.host = host;
        }
        if let Some(port) = read(PORT_ENV) {
            config.port = port.parse().map_err(|err| {
                MessageStoreError::InvalidConfig(format!("{PORT_ENV}='{port}': {err}"))
            })?;
        }
        if let Some(timeout_ms) = read(TIMEOUT_MS_ENV) {
            let millis: u64 = timeout_ms.parse().map_err(|err| {
                MessageStoreError::InvalidConfig(format!("{TIMEOUT_MS_ENV}='{timeout_ms}': {err}"))
            })?;
            config.timeout = Some(Duration::from_millis(millis));
        }
        Ok(config)
    }
}
