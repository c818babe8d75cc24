use std::time::Duration;

use crate::config::ClientConfig;
use crate::entry::{Entry, WireEntry, decode_entry};
use crate::errors::{MessageStoreError, MessageStoreResult, Operation};

pub const PRODUCE_PATH: &str = "/produce";
pub const CONSUME_PATH: &str = "/consume";
pub const OFFSET_HEADER: &str = "x-offset";

/// One reqwest client bound to a store address.
///
/// The client's timeout covers the whole request, including reading the body.
/// Cloning shares the connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> MessageStoreResult<Self> {
        let timeout = config.effective_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| {
                MessageStoreError::InvalidConfig(format!("http client build failed: {err}"))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.endpoint(path))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.endpoint(path))
    }
}

pub(crate) fn validate_topic(topic: &str) -> MessageStoreResult<()> {
    if topic.trim().is_empty() {
        return Err(MessageStoreError::InvalidInput(
            "topic must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reads a 200 body as a wire entry and decodes it.
pub(crate) async fn read_entry(
    operation: Operation,
    topic: &str,
    offset: i64,
    response: reqwest::Response,
) -> MessageStoreResult<Entry> {
    let body = response
        .bytes()
        .await
        .map_err(|err| MessageStoreError::transport(operation, topic, Some(offset), err))?;
    let wire: WireEntry = serde_json::from_slice(&body)
        .map_err(|err| MessageStoreError::malformed(operation, topic, Some(offset), err))?;
    decode_entry(wire).map_err(|err| MessageStoreError::malformed(operation, topic, Some(offset), err))
}
