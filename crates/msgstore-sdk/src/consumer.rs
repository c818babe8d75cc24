use crate::config::ConsumerConfig;
use crate::entry::Entry;
use crate::errors::{MessageStoreError, MessageStoreResult, Operation};
use crate::transport::{CONSUME_PATH, HttpTransport, read_entry, validate_topic};

/// Reads single entries by offset without waiting.
#[derive(Clone, Debug)]
pub struct Consumer {
    transport: HttpTransport,
}

impl Consumer {
    pub fn new(config: ConsumerConfig) -> MessageStoreResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport })
    }

    /// Fetches the entry stored at `offset` in `topic`.
    ///
    /// Any status other than `200 OK` is an [`MessageStoreError::UnexpectedStatus`];
    /// the store does not distinguish a missing offset from other failures.
    pub async fn get_entry(&self, topic: &str, offset: i64) -> MessageStoreResult<Entry> {
        const OPERATION: Operation = Operation::Consume;
        validate_topic(topic)?;
        if offset < 0 {
            return Err(MessageStoreError::InvalidInput(format!(
                "offset must be non-negative, got {offset}"
            )));
        }

        tracing::debug!(operation = %OPERATION, topic, offset, "fetching entry");
        let response = self
            .transport
            .get(CONSUME_PATH)
            .query(&[("topic", topic.to_string()), ("offset", offset.to_string())])
            .send()
            .await
            .map_err(|err| MessageStoreError::transport(OPERATION, topic, Some(offset), err))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(operation = %OPERATION, topic, offset, status = status.as_u16(), "unexpected status");
            return Err(MessageStoreError::unexpected_status(
                OPERATION,
                topic,
                Some(offset),
                status.as_u16(),
            ));
        }

        read_entry(OPERATION, topic, offset, response).await
    }
}
