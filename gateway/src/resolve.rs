//! Dependent lookups resolving SharePoint-style file references and
//! group-site batches.

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::client::GraphClient;
use crate::error::Result;
use crate::path;

/// Field carrying the pre-signed direct-download URL in file metadata.
const DOWNLOAD_URL_FIELD: &str = "@microsoft.graph.downloadUrl";

/// Finds the SharePoint id for a site or team from its relative token.
///
/// An unknown site is expected and recoverable: the lookup logs and returns
/// `None` rather than failing the request.
async fn lookup_site_id(client: &GraphClient, site: &str) -> Result<Option<String>> {
    let url = client.join(&format!("sites/{site}"));
    debug!(url = %url, "SharePoint site id url");

    let response = client.get(&url).await?;
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(site = %site, body = %body, "Unable to determine site id");
        return Ok(None);
    }

    let body: Value = response.json().await?;
    Ok(body.get("id").and_then(Value::as_str).map(str::to_string))
}

/// Finds the documents drive root URL for a site, given its id.
async fn lookup_drive_url(client: &GraphClient, site_id: &str) -> Result<Option<String>> {
    let url = client.join(&format!("sites/{site_id}/drive"));
    debug!(url = %url, "Site documents drive url");

    let response = client.get(&url).await?;
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(site_id = %site_id, body = %body, "Unable to determine documents drive id");
        return Ok(None);
    }

    let body: Value = response.json().await?;
    let Some(drive_id) = body.get("id").and_then(Value::as_str) else {
        error!(site_id = %site_id, "Drive response carried no id");
        return Ok(None);
    };

    Ok(Some(client.join(&format!(
        "sites/{site_id}/drives/{drive_id}/root:/"
    ))))
}

/// Finds the pre-signed download URL for a file path within a drive.
async fn lookup_download_url(
    client: &GraphClient,
    drive_url: &str,
    file_path: &str,
) -> Result<Option<String>> {
    let url = format!("{drive_url}{file_path}");
    debug!(url = %url, "File details request url");

    let response = client.get(&url).await?;
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(path = %file_path, body = %body, "Failed to get download url for file");
        return Ok(None);
    }

    let body: Value = response.json().await?;
    Ok(body
        .get(DOWNLOAD_URL_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string))
}

/// Resolves a file within a SharePoint site to raw bytes.
///
/// Three dependent lookups run strictly in sequence: site id, documents
/// drive URL, then download URL. The first stage that finds nothing
/// short-circuits the chain with `Ok(None)`. The final fetch is a plain
/// unauthenticated GET: the download URL is pre-signed and must not carry
/// the bearer header.
pub async fn fetch_file(
    client: &GraphClient,
    file_path: &str,
    site: &str,
) -> Result<Option<Vec<u8>>> {
    let Some(site_id) = lookup_site_id(client, site).await? else {
        error!(site = %site, "Unable to determine documents drive without a valid site id");
        return Ok(None);
    };

    let Some(drive_url) = lookup_drive_url(client, &site_id).await? else {
        error!(site = %site, "Unable to determine download url without a valid drive url");
        return Ok(None);
    };

    let Some(download_url) = lookup_download_url(client, &drive_url, file_path).await? else {
        return Ok(None);
    };

    debug!(url = %download_url, "File download url");
    let response = client.get_unauthenticated(&download_url).await?;
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(path = %file_path, body = %body, "Failed to retrieve file");
        return Ok(None);
    }

    Ok(Some(response.bytes().await?.to_vec()))
}

/// Resolves the root site for each entity in a posted batch.
///
/// For every entity the group id is extracted by key-name suffix match; the
/// group's root site is looked up and yielded with an `_id` field carrying
/// the group id. Entities with no id-like key, and groups with no site, are
/// logged and skipped rather than failing the batch.
pub fn resolve_site_urls(
    client: Arc<GraphClient>,
    entities: Vec<Value>,
) -> impl Stream<Item = Result<Value>> + Send + 'static {
    info!(count = entities.len(), "Fetching site urls");
    stream::try_unfold(
        (client, entities.into_iter()),
        |(client, mut entities)| async move {
            loop {
                let Some(entity) = entities.next() else {
                    return Ok(None);
                };

                let Some(group_id) = path::entity_id(&entity).map(str::to_string) else {
                    warn!("Entity exposes no id-like key, skipping");
                    continue;
                };
                info!(group_id = %group_id, "Resolving root site for group");

                let url = client.join(&format!("groups/{group_id}/sites/root"));
                let response = client.get(&url).await?;
                if !response.status().is_success() {
                    info!(group_id = %group_id, "No site url for group");
                    continue;
                }

                let mut site: Value = response.json().await?;
                if let Some(object) = site.as_object_mut() {
                    object.insert("_id".to_string(), Value::String(group_id));
                }
                return Ok(Some((site, (client, entities))));
            }
        },
    )
}
