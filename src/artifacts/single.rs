use std::path::{Path, PathBuf};

use log::{error, info};
use serde_json::{json, Value};

use crate::auth::Token;
use crate::client::CircleCiClient;
use crate::error::{CircleCiError, Result};
use crate::links::basename;

/// Download one artifact URL to `destination`.
///
/// Never fails: returns `{"success": true, "path": ...}` or
/// `{"success": false, "error": ...}`.
pub async fn download_artifact(
    client: &CircleCiClient,
    token: &Token,
    url: &str,
    destination: &Path,
) -> Value {
    match client.download(url, Some(token), destination).await {
        Ok(bytes) => {
            info!(
                "Downloaded artifact to {} ({bytes} bytes)",
                destination.display()
            );
            json!({ "success": true, "path": destination.display().to_string() })
        }
        Err(e) => {
            error!("Failed to download artifact: {e}");
            json!({ "success": false, "error": failure_label(&e) })
        }
    }
}

/// Download a v1.1 build artifact to `output_file_name`, or to the URL's
/// file name in the working directory.
pub async fn download_legacy_artifact(
    client: &CircleCiClient,
    token: &Token,
    url: &str,
    output_file_name: Option<&str>,
) -> Result<Value> {
    let destination = legacy_destination(url, output_file_name)?;
    let bytes = client.download(url, Some(token), &destination).await?;
    info!("Downloaded {} ({bytes} bytes)", destination.display());

    Ok(json!({
        "success": true,
        "path": destination.display().to_string(),
        "bytes": bytes,
    }))
}

fn legacy_destination(url: &str, output_file_name: Option<&str>) -> Result<PathBuf> {
    if let Some(name) = output_file_name.filter(|name| !name.is_empty()) {
        return Ok(PathBuf::from(name));
    }

    let name = basename(url);
    if name.is_empty() {
        return Err(CircleCiError::validation(format!(
            "Cannot derive a file name from '{url}', set output_file_name"
        )));
    }
    Ok(PathBuf::from(name))
}

fn failure_label(error: &CircleCiError) -> String {
    match error {
        CircleCiError::Api { status, .. } => format!("HTTP {status}"),
        other => other.to_string(),
    }
}
