use crate::config::ProducerConfig;
use crate::entry::{Entry, encode_entry};
use crate::errors::{MessageStoreError, MessageStoreResult, Operation, ResponseDecodeError};
use crate::transport::{HttpTransport, OFFSET_HEADER, PRODUCE_PATH, validate_topic};

/// Appends entries to topics.
#[derive(Clone, Debug)]
pub struct Producer {
    transport: HttpTransport,
}

impl Producer {
    pub fn new(config: ProducerConfig) -> MessageStoreResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport })
    }

    /// Appends `entry` to `topic` and returns the offset the store assigned.
    ///
    /// Exactly one `POST /produce?topic=...` is made. The store must answer
    /// `201 Created` with the offset in the `x-offset` header.
    pub async fn send_entry(&self, topic: &str, entry: &Entry) -> MessageStoreResult<i64> {
        const OPERATION: Operation = Operation::Produce;
        validate_topic(topic)?;

        let body = serde_json::to_vec(&encode_entry(entry)).map_err(|err| {
            MessageStoreError::InvalidInput(format!("entry json encode failed: {err}"))
        })?;

        tracing::debug!(
            operation = %OPERATION,
            topic,
            key_len = entry.key.len(),
            value_len = entry.value.len(),
            "sending entry"
        );
        let response = self
            .transport
            .post(PRODUCE_PATH)
            .query(&[("topic", topic)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| MessageStoreError::transport(OPERATION, topic, None, err))?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            tracing::debug!(operation = %OPERATION, topic, status = status.as_u16(), "unexpected status");
            return Err(MessageStoreError::unexpected_status(
                OPERATION,
                topic,
                None,
                status.as_u16(),
            ));
        }

        let offset = parse_offset_header(response.headers()).map_err(|reason| {
            MessageStoreError::malformed(OPERATION, topic, None, ResponseDecodeError::Header(reason))
        })?;
        tracing::debug!(operation = %OPERATION, topic, offset, "entry appended");
        Ok(offset)
    }
}

fn parse_offset_header(headers: &reqwest::header::HeaderMap) -> Result<i64, String> {
    let raw = headers
        .get(OFFSET_HEADER)
        .ok_or_else(|| format!("missing {OFFSET_HEADER} header"))?;
    let text = raw
        .to_str()
        .map_err(|err| format!("{OFFSET_HEADER} header is not text: {err}"))?;
    text.trim()
        .parse::<i64>()
        .map_err(|err| format!("{OFFSET_HEADER} header '{text}' is not an integer: {err}"))
}
