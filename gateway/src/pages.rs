//! Cursor-based pagination over upstream entity collections.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, Stream, TryStreamExt};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::client::GraphClient;
use crate::error::{GatewayError, Result};
use crate::path;

struct PageWalk {
    client: Arc<GraphClient>,
    cursor: Option<String>,
    // Caller-supplied query arguments, consumed by the first page only;
    // cursor URLs are self-contained and followed verbatim.
    query: Option<Vec<(String, String)>>,
    pages: u32,
}

/// Produces a lazy stream of entities drawn from one or more pages rooted at
/// `base_url + path`.
///
/// The stream is single-pass; calling `fetch_entities` again starts a fresh
/// cursor walk. A non-success page response ends the stream with a `Fetch`
/// error; entities already yielded stand.
pub fn fetch_entities(
    client: Arc<GraphClient>,
    request_path: &str,
    query: Vec<(String, String)>,
) -> impl Stream<Item = Result<Value>> + Send + 'static {
    info!(path = %request_path, "Fetching data from paged url");
    let first_page = client.join(request_path);
    let walk = PageWalk {
        client,
        cursor: Some(first_page),
        query: if query.is_empty() { None } else { Some(query) },
        pages: 0,
    };

    stream::try_unfold(walk, |mut walk| async move {
        let Some(url) = walk.cursor.take() else {
            info!(pages = walk.pages, "Returning entities from cursor walk");
            return Ok(None);
        };

        if let Some(ms) = walk.client.config().sleep_ms {
            info!(sleep_ms = ms, "Sleeping before page fetch");
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        info!(url = %url, "Fetching page");
        let query = walk.query.take();
        let response = walk
            .client
            .execute(Method::GET, &url, query.as_deref())
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Unexpected page response status");
            return Err(GatewayError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let page: Value = response.json().await?;

        let entities: Vec<Value> = match path::lookup(&page, &walk.client.config().entities_path) {
            Some(Value::Array(items)) => items.clone(),
            Some(_) | None => {
                debug!(
                    selector = %walk.client.config().entities_path,
                    "No entity collection at configured path, treating page as empty"
                );
                Vec::new()
            }
        };

        walk.cursor = path::lookup(&page, &walk.client.config().next_page)
            .and_then(Value::as_str)
            .map(str::to_string);
        walk.pages += 1;

        Ok(Some((
            stream::iter(entities.into_iter().map(Ok::<Value, GatewayError>)),
            walk,
        )))
    })
    .try_flatten()
}
