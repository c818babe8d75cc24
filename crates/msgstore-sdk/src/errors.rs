use std::fmt;

use crate::entry::CodecError;

/// Which client call produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Produce,
    Consume,
    Poll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Produce => "produce",
            Self::Consume => "consume",
            Self::Poll => "poll",
        };
        f.write_str(name)
    }
}

/// Why a response body or header could not be read as the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum ResponseDecodeError {
    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Payload(#[from] CodecError),
    #[error("{0}")]
    Header(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MessageStoreError {
    #[error("{operation} on topic '{topic}'{} failed in transport: {source}", at_offset(.offset))]
    Transport {
        operation: Operation,
        topic: String,
        offset: Option<i64>,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} on topic '{topic}'{} returned unexpected status code: {code}", at_offset(.offset))]
    UnexpectedStatus {
        operation: Operation,
        topic: String,
        offset: Option<i64>,
        code: u16,
    },
    #[error("{operation} on topic '{topic}'{} returned a malformed response: {source}", at_offset(.offset))]
    MalformedResponse {
        operation: Operation,
        topic: String,
        offset: Option<i64>,
        #[source]
        source: ResponseDecodeError,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

pub type MessageStoreResult<T> = Result<T, MessageStoreError>;

fn at_offset(offset: &Option<i64>) -> String {
    offset
        .map(|offset| format!(" at offset {offset}"))
        .unwrap_or_default()
}

impl MessageStoreError {
    pub(crate) fn transport(
        operation: Operation,
        topic: &str,
        offset: Option<i64>,
        source: reqwest::Error,
    ) -> Self {
        Self::Transport {
            operation,
            topic: topic.to_string(),
            offset,
            source,
        }
    }

    pub(crate) fn unexpected_status(
        operation: Operation,
        topic: &str,
        offset: Option<i64>,
        code: u16,
    ) -> Self {
        Self::UnexpectedStatus {
            operation,
            topic: topic.to_string(),
            offset,
            code,
        }
    }

    pub(crate) fn malformed(
        operation: Operation,
        topic: &str,
        offset: Option<i64>,
        source: impl Into<ResponseDecodeError>,
    ) -> Self {
        Self::MalformedResponse {
            operation,
            topic: topic.to_string(),
            offset,
            source: source.into(),
        }
    }

    /// HTTP status carried by an [`MessageStoreError::UnexpectedStatus`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. }
            | Self::UnexpectedStatus { operation, .. }
            | Self::MalformedResponse { operation, .. } => Some(*operation),
            Self::InvalidInput(_) | Self::InvalidConfig(_) => None,
        }
    }

    /// Offset or poll cursor the failed request named; `None` for produce.
    pub fn offset(&self) -> Option<i64> {
        match self {
            Self::Transport { offset, .. }
            | Self::UnexpectedStatus { offset, .. }
            | Self::MalformedResponse { offset, .. } => *offset,
            Self::InvalidInput(_) | Self::InvalidConfig(_) => None,
        }
    }
}
