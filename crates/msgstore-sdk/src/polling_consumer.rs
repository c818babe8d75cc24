use std::time::Duration;

use crate::config::PollingConsumerConfig;
use crate::duration::format_poll_duration;
use crate::entry::Entry;
use crate::errors::{MessageStoreError, MessageStoreResult, Operation};
use crate::transport::{CONSUME_PATH, HttpTransport, read_entry, validate_topic};

/// Successful result of a long-poll.
///
/// An empty window is a normal outcome, not an error; failures travel through
/// the `Err` side of [`MessageStoreResult`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Entry(Entry),
    /// The store answered `204 No Content`: nothing arrived within the window.
    Empty,
}

impl PollOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Self::Entry(entry) => Some(entry),
            Self::Empty => None,
        }
    }
}

/// Reads the next entry of a topic, letting the store hold the request open
/// for up to a caller-chosen window.
///
/// The configured request timeout must be larger than any poll duration passed
/// to [`PollingConsumer::poll_for_next_entry`], with margin for the round trip.
/// It is never adjusted here: a too-short timeout surfaces as a transport error.
#[derive(Clone, Debug)]
pub struct PollingConsumer {
    transport: HttpTransport,
}

impl PollingConsumer {
    pub fn new(config: PollingConsumerConfig) -> MessageStoreResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport })
    }

    /// Issues `GET /consume?topic=..&offset=..&pollDuration=..` once.
    ///
    /// `offset` is an opaque cursor, normally the last offset seen; which entry
    /// counts as "next" is decided by the store. Safe to repeat: the call has
    /// no effect on the store.
    pub async fn poll_for_next_entry(
        &self,
        topic: &str,
        offset: i64,
        poll_duration: Duration,
    ) -> MessageStoreResult<PollOutcome> {
        const OPERATION: Operation = Operation::Poll;
        validate_topic(topic)?;

        let timeout = self.transport.timeout();
        if timeout <= poll_duration {
            tracing::warn!(
                topic,
                ?timeout,
                ?poll_duration,
                "request timeout does not exceed poll duration; the request may be cut off before the store replies"
            );
        }

        let poll_text = format_poll_duration(poll_duration);
        tracing::debug!(operation = %OPERATION, topic, offset, poll_duration = %poll_text, "polling for entry");
        let response = self
            .transport
            .get(CONSUME_PATH)
            .query(&[
                ("topic", topic.to_string()),
                ("offset", offset.to_string()),
                ("pollDuration", poll_text),
            ])
            .send()
            .await
            .map_err(|err| MessageStoreError::transport(OPERATION, topic, Some(offset), err))?;

        match response.status() {
            reqwest::StatusCode::NO_CONTENT => {
                tracing::debug!(operation = %OPERATION, topic, offset, "poll window elapsed without entry");
                Ok(PollOutcome::Empty)
            }
            reqwest::StatusCode::OK => read_entry(OPERATION, topic, offset, response)
                .await
                .map(PollOutcome::Entry),
            status => {
                tracing::debug!(operation = %OPERATION, topic, offset, status = status.as_u16(), "unexpected status");
                Err(MessageStoreError::unexpected_status(
                    OPERATION,
                    topic,
                    Some(offset),
                    status.as_u16(),
                ))
            }
        }
    }
}
