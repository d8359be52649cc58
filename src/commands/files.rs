//! Generic UI primitives: saving text to disk and asking for a message box.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::parse_params;
use crate::config::expand_path;
use crate::daemon::{ShellEvent, Supervisor};
use crate::error::{Result, ShellError};

#[derive(Debug, Deserialize)]
struct SaveParams {
    #[serde(default)]
    content: String,
    #[serde(default)]
    filename: String,
}

/// Where `filename` lands: absolute paths (after `~` expansion) as given,
/// relative names under `export_dir` and never above it.
pub fn resolve_save_path(export_dir: &Path, filename: &str) -> Result<PathBuf> {
    let path = expand_path(filename);
    if path.is_absolute() {
        return Ok(path);
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(ShellError::InvalidParams(format!(
            "filename must stay inside the export directory: {}",
            filename
        )));
    }
    Ok(export_dir.join(path))
}

/// `save-file {content, filename}`. An empty filename means the user
/// cancelled.
pub async fn save(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: SaveParams = parse_params(params)?;
    if params.filename.trim().is_empty() {
        return Ok(json!({ "status": "cancelled" }));
    }

    let path = resolve_save_path(&supervisor.config().export_dir(), &params.filename)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, params.content.as_bytes()).await?;
    info!(path = %path.display(), "file saved");

    Ok(json!({ "status": "success", "path": path.display().to_string() }))
}

/// `open-dialog {options}`: forwarded to UI clients as a `dialog` event.
/// The shell has no window, so the answer is always the default button.
pub fn open_dialog(supervisor: &Supervisor, params: Value) -> Value {
    let options = match params {
        Value::Object(mut map) if map.contains_key("options") => {
            map.remove("options").unwrap_or(Value::Null)
        }
        other => other,
    };
    supervisor.emit(ShellEvent::Dialog { options });
    json!({ "response": 0, "checkboxChecked": false })
}
