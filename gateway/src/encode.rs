//! Incremental JSON array encoding.

use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use serde_json::Value;

enum Phase {
    Open,
    Body { first: bool },
    Done,
}

/// Encodes a sequence of records as a JSON array, one chunk at a time.
///
/// The collection is never materialized: the opening bracket, each
/// comma-separated record, and the closing bracket are yielded as separate
/// chunks. An upstream error ends the stream without the closing bracket --
/// a truncated array is the documented failure mode once the response has
/// started, and clients must treat an unterminated array as a failed
/// request.
pub fn json_array<S, E>(entities: S) -> impl Stream<Item = Result<String, E>> + Send
where
    S: Stream<Item = Result<Value, E>> + Send + 'static,
    E: From<serde_json::Error> + Send + 'static,
{
    let entities: Pin<Box<S>> = Box::pin(entities);
    stream::unfold(
        (entities, Phase::Open),
        |(mut entities, phase)| async move {
            match phase {
                Phase::Open => Some((Ok("[".to_string()), (entities, Phase::Body { first: true }))),
                Phase::Body { first } => match entities.next().await {
                    Some(Ok(record)) => {
                        let encoded = match serde_json::to_string(&record) {
                            Ok(json) if first => json,
                            Ok(json) => format!(",{json}"),
                            Err(e) => return Some((Err(E::from(e)), (entities, Phase::Done))),
                        };
                        Some((Ok(encoded), (entities, Phase::Body { first: false })))
                    }
                    Some(Err(e)) => Some((Err(e), (entities, Phase::Done))),
                    None => Some((Ok("]".to_string()), (entities, Phase::Done))),
                },
                Phase::Done => None,
            }
        },
    )
}
