//! Writes the visible result rows to CSV or tab-delimited text.

use crate::core::SearchResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const HEADER: [&str; 3] = ["Name", "Path", "Match"];

/// Output format. Chosen from the target file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated with a header row.
    Csv,
    /// Tab-separated, no header.
    Text,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Text,
        }
    }
}

/// Renders `rows` in display order.
pub fn render<'a, I>(rows: I, format: ExportFormat) -> String
where
    I: IntoIterator<Item = &'a SearchResult>,
{
    let mut output = String::new();

    if format == ExportFormat::Csv {
        output.push_str(&HEADER.join(","));
        output.push('\n');
    }

    for row in rows {
        let path = row.path.to_string_lossy();
        let cells = [row.name.as_str(), path.as_ref(), row.match_text.as_str()];
        let line = match format {
            ExportFormat::Csv => cells.iter().map(|c| escape_csv(c)).collect::<Vec<_>>().join(","),
            ExportFormat::Text => cells.join("\t"),
        };
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Renders `rows` into `path`. Returns the number of rows written.
pub fn write_rows<'a, I>(rows: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a SearchResult>,
{
    let rows: Vec<_> = rows.into_iter().collect();
    let content = render(rows.iter().copied(), ExportFormat::from_path(path));
    fs::write(path, content).with_context(|| format!("Could not export results to {}", path.display()))?;
    tracing::info!("Exported results to {}", path.display());
    Ok(rows.len())
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
