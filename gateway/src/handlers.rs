//! HTTP request handlers for the gateway.

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures_util::stream::{Stream, TryStreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::encode;
use crate::error::{GatewayError, Result};
use crate::pages;
use crate::resolve;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub token: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let token = if state.graph.has_token().await {
        "held"
    } else {
        "absent"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            token: token.to_string(),
        }),
    )
}

/// Wraps an entity stream in an incrementally encoded JSON array body.
///
/// The response status is committed before the first page is fetched, so a
/// mid-stream failure surfaces as a truncated array rather than an error
/// status.
fn stream_json_response<S>(entities: S) -> Response
where
    S: Stream<Item = Result<Value>> + Send + 'static,
{
    let chunks = encode::json_array(entities).map_ok(String::into_bytes);
    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(chunks),
    )
        .into_response()
}

/// GET /entities/{*path}
///
/// Streams every entity from the paged collection at `base_url + path`.
/// Query arguments are forwarded to the first page only.
pub async fn get_entities(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(args): Query<Vec<(String, String)>>,
) -> Response {
    stream_json_response(pages::fetch_entities(state.graph.clone(), &path, args))
}

/// POST /entities/{*path}
///
/// The JSON body (a JSON-encoded string) overrides the path segment.
pub async fn post_entities(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response> {
    let path = body
        .as_str()
        .ok_or_else(|| {
            GatewayError::InvalidPath("POST body must be a JSON-encoded path string".to_string())
        })?
        .to_string();

    Ok(stream_json_response(pages::fetch_entities(
        state.graph.clone(),
        &path,
        Vec::new(),
    )))
}

/// POST /siteurl
///
/// Resolves the root site for each posted entity and streams the resolved
/// site descriptors back as a JSON array.
pub async fn post_siteurl(
    State(state): State<AppState>,
    Json(entities): Json<Vec<Value>>,
) -> Response {
    stream_json_response(resolve::resolve_site_urls(state.graph.clone(), entities))
}

/// GET /file/{*path}
///
/// Path shape: `<site-segment-1>/<site-segment-2>/<relative file path...>`.
/// The first two segments, prefixed with the SharePoint host, form the site
/// token; the rest is the file path within the documents drive.
pub async fn get_file(State(state): State<AppState>, Path(path): Path<String>) -> Result<Response> {
    let sharepoint_url = state.config.sharepoint_url.as_deref().ok_or_else(|| {
        GatewayError::Configuration(
            "SHAREPOINT_URL must be set to use the file endpoint".to_string(),
        )
    })?;

    let host = reqwest::Url::parse(sharepoint_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .ok_or_else(|| {
            GatewayError::Configuration(format!(
                "SHAREPOINT_URL '{sharepoint_url}' has no parseable host"
            ))
        })?;

    tracing::info!(path = %path, "File request");
    let (site_path, file_path) = split_file_path(&path)?;
    let site = format!("{host}:/{site_path}");

    match resolve::fetch_file(&state.graph, &file_path, &site).await? {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response()),
        None => Err(GatewayError::ResolutionNotFound(format!(
            "Unable to resolve file '{file_path}'"
        ))),
    }
}

/// Splits a file request path into its site segments and the file path.
fn split_file_path(path: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 3 {
        tracing::error!(path = %path, "Invalid file path specified");
        return Err(GatewayError::InvalidPath(format!(
            "Invalid path specified: '{path}'"
        )));
    }
    Ok((parts[..2].join("/"), parts[2..].join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_file_path_minimum_segments() {
        let (site, file) = split_file_path("a/b/c").unwrap();
        assert_eq!(site, "a/b");
        assert_eq!(file, "c");
    }

    #[test]
    fn test_split_file_path_deep() {
        let (site, file) = split_file_path("a/b/c/d.csv").unwrap();
        assert_eq!(site, "a/b");
        assert_eq!(file, "c/d.csv");
    }

    #[test]
    fn test_split_file_path_too_few_segments() {
        let err = split_file_path("a/b").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidPath(_)));
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            token: "absent".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("absent"));
    }
}
