#![doc = r#"
Client SDK for the HTTP message store.

Operation mapping:

| Client method | Store API | Success |
| --- | --- | --- |
| `Producer::send_entry` | `POST /produce?topic=` | `201`, offset in `x-offset` |
| `Consumer::get_entry` | `GET /consume?topic=&offset=` | `200`, wire entry body |
| `PollingConsumer::poll_for_next_entry` | `GET /consume?topic=&offset=&pollDuration=` | `200` entry, `204` empty |

Implementation notes:
- Every call is a single request bounded by the configured timeout. There are no retries.
- Keys and values are arbitrary bytes and travel as standard base64 inside JSON.
- Malformed payloads come back as `MessageStoreError::MalformedResponse`; nothing panics on server input.
- The library emits `tracing` events but never installs a subscriber.
"#]

pub mod config;
pub mod consumer;
pub mod duration;
pub mod entry;
pub mod errors;
pub mod polling_consumer;
pub mod producer;
mod transport;

pub use config::{
    ClientConfig, ConsumerConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT,
    PollingConsumerConfig, ProducerConfig,
};
pub use consumer::Consumer;
pub use duration::format_poll_duration;
pub use entry::{CodecError, Entry, WireEntry, decode_entry, encode_entry};
pub use errors::{MessageStoreError, MessageStoreResult, Operation, ResponseDecodeError};
pub use polling_consumer::{PollOutcome, PollingConsumer};
pub use producer::Producer;
