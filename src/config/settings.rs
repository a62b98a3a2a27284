use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::SavedQueries;

const APP_NAME: &str = "FileTracer";
const QUERIES_FILE: &str = "search_queries.json";
const LOG_FILE: &str = "app.log";

/// Returns the platform-specific data directory for the application.
pub fn get_data_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "filetracer", APP_NAME).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Returns the full path to the saved-queries file.
pub fn get_queries_file_path() -> Option<PathBuf> {
    get_data_directory().map(|dir| dir.join(QUERIES_FILE))
}

/// Returns the default log file path.
pub fn get_log_file_path() -> Option<PathBuf> {
    get_data_directory().map(|dir| dir.join(LOG_FILE))
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_queries_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory")),
    }
}

/// Loads saved queries from `path`, or from the default location.
///
/// A missing file yields an empty set. A file that cannot be parsed is logged
/// and also treated as empty, so one bad edit does not lock the user out.
pub fn load_queries(path: Option<&Path>) -> Result<SavedQueries> {
    let queries_path = resolve(path)?;

    if !queries_path.exists() {
        tracing::info!(
            "No queries file found at {:?}. Initializing empty.",
            queries_path
        );
        return Ok(SavedQueries::default());
    }

    let content = fs::read_to_string(&queries_path)
        .with_context(|| format!("Could not read {}", queries_path.display()))?;

    match serde_json::from_str::<SavedQueries>(&content) {
        Ok(queries) => {
            tracing::info!("Loaded queries from {:?}", queries_path);
            Ok(queries)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse queries file at {:?}: {}. Starting with no saved queries.",
                queries_path,
                e
            );
            Ok(SavedQueries::default())
        }
    }
}

/// Writes `queries` as pretty-printed JSON, creating the parent directory.
pub fn save_queries(queries: &SavedQueries, path: Option<&Path>) -> Result<()> {
    let queries_path = resolve(path)?;

    if let Some(parent) = queries_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
            tracing::info!("Created data directory: {:?}", parent);
        }
    }

    let json = serde_json::to_string_pretty(queries)?;
    fs::write(&queries_path, json)
        .with_context(|| format!("Could not write {}", queries_path.display()))?;
    tracing::info!("Saved queries to {:?}", queries_path);
    Ok(())
}

// Platform-specific data paths for reference:
// macOS:   ~/Library/Application Support/com.filetracer.FileTracer/
// Linux:   ~/.local/share/filetracer/
// Windows: %APPDATA%/filetracer/FileTracer/data/
