//! The result table shared by search, filtering and batch operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One row of search output. A name-only match has an empty `match_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub path: PathBuf,
    pub match_text: String,
}

impl SearchResult {
    pub fn name_match(path: PathBuf) -> Self {
        let name = file_name_of(&path);
        Self {
            name,
            path,
            match_text: String::new(),
        }
    }

    pub fn line_match(path: PathBuf, line_number: usize, line: &str) -> Self {
        let name = file_name_of(&path);
        Self {
            name,
            path,
            match_text: format!("{}: {}", line_number, line.trim()),
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Search rows in insertion order plus a per-row visibility mask.
///
/// Filtering only flips the mask, so the row list itself changes only through
/// [`ResultSet::push`], [`ResultSet::rename_first`] and
/// [`ResultSet::remove_first`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    rows: Vec<SearchResult>,
    visible: Vec<bool>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: SearchResult) {
        self.rows.push(row);
        self.visible.push(true);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.visible.clear();
    }

    pub fn rows(&self) -> &[SearchResult] {
        &self.rows
    }

    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    /// Replaces the visibility mask. A mask of the wrong length is ignored
    /// and `false` is returned.
    pub fn set_visibility(&mut self, mask: Vec<bool>) -> bool {
        if mask.len() != self.rows.len() {
            return false;
        }
        self.visible = mask;
        true
    }

    pub fn show_all(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = true);
    }

    /// Rows currently shown, in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &SearchResult> {
        self.rows
            .iter()
            .zip(self.visible.iter())
            .filter(|(_, visible)| **visible)
            .map(|(row, _)| row)
    }

    /// Points the first row at `old` to `new`, updating its name too.
    /// Returns `false` if no row had that path.
    pub fn rename_first(&mut self, old: &Path, new: &Path) -> bool {
        match self.rows.iter_mut().find(|row| row.path == old) {
            Some(row) => {
                row.path = new.to_path_buf();
                row.name = file_name_of(new);
                true
            }
            None => false,
        }
    }

    /// Drops the first row at `path`. Returns `false` if there was none.
    pub fn remove_first(&mut self, path: &Path) -> bool {
        match self.rows.iter().position(|row| row.path == path) {
            Some(index) => {
                self.rows.remove(index);
                self.visible.remove(index);
                true
            }
            None => false,
        }
    }
}

impl FromIterator<SearchResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = SearchResult>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for row in iter {
            set.push(row);
        }
        set
    }
}
