//! Batch rename, copy and delete over a selection of result paths.
//!
//! Items run one at a time. A failing item is reported and skipped; the rest
//! of the batch still runs. Rename and delete reconcile the result set as they
//! go (first row with the old path wins); copy leaves it alone.
//!
//! None of these functions ask for confirmation. Callers must have obtained it.

use super::diagnostics::{DiagnosticsSink, SearchEvent};
use super::error::{BatchOperation, ItemFailure, ItemOperationError};
use super::results::ResultSet;
use super::walker::validate_root;
use super::CoreError;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Removes repeated paths, keeping the first occurrence of each.
pub fn dedupe_paths<I>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// One item that went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedItem {
    pub source: PathBuf,
    /// New path for rename, copy target for copy, `None` for delete.
    pub destination: Option<PathBuf>,
}

/// Per-item outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<CompletedItem>,
    pub failed: Vec<ItemOperationError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn succeed(&mut self, source: PathBuf, destination: Option<PathBuf>) {
        self.completed.push(CompletedItem {
            source,
            destination,
        });
    }

    fn fail(&mut self, error: ItemOperationError, sink: &dyn DiagnosticsSink) {
        sink.record(&SearchEvent::ItemFailed {
            operation: error.operation,
            path: error.path.clone(),
            message: error.source.to_string(),
        });
        self.failed.push(error);
    }
}

/// A file-name template with `{name}`, `{ext}` and `{counter}` placeholders.
///
/// `{name}` is the file stem, `{ext}` the extension without its dot, and
/// `{counter}` the 1-based position in the batch. `{counter:03}` zero-pads.
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePattern(String);

impl RenamePattern {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands the template for one file.
    pub fn expand(&self, name: &str, ext: &str, counter: usize) -> Result<String, ItemFailure> {
        let mut out = String::with_capacity(self.0.len() + name.len());
        let mut chars = self.0.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => field.push(ch),
                            None => {
                                return Err(ItemFailure::Template(format!(
                                    "unclosed '{{' in '{}'",
                                    self.0
                                )))
                            }
                        }
                    }
                    out.push_str(&Self::substitute(&field, name, ext, counter)?);
                }
                '}' => {
                    return Err(ItemFailure::Template(format!(
                        "single '}}' in '{}'",
                        self.0
                    )))
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }

    fn substitute(field: &str, name: &str, ext: &str, counter: usize) -> Result<String, ItemFailure> {
        let (key, spec) = match field.split_once(':') {
            Some((key, spec)) => (key, Some(spec)),
            None => (field, None),
        };

        match (key, spec) {
            ("name", None) => Ok(name.to_string()),
            ("ext", None) => Ok(ext.to_string()),
            ("counter", None) => Ok(counter.to_string()),
            ("counter", Some(spec)) => {
                let width: usize = spec
                    .trim_start_matches('0')
                    .parse()
                    .map_err(|_| ItemFailure::Template(format!("bad counter width '{spec}'")))?;
                if spec.starts_with('0') {
                    Ok(format!("{counter:0width$}"))
                } else {
                    Ok(format!("{counter:>width$}"))
                }
            }
            _ => Err(ItemFailure::Template(format!("unknown placeholder '{{{field}}}'"))),
        }
    }
}

/// A utility struct for batch file operations.
///
/// This struct is stateless and provides methods as associated functions.
pub struct BatchProcessor;

impl BatchProcessor {
    /// Renames each selected path in place according to `pattern`.
    ///
    /// Targets must stay in the same directory and must not already exist.
    pub fn rename(
        selection: &[PathBuf],
        pattern: &RenamePattern,
        results: &mut ResultSet,
        sink: &dyn DiagnosticsSink,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, old_path) in dedupe_paths(selection.iter().cloned()).into_iter().enumerate() {
            match Self::rename_one(&old_path, pattern, index + 1) {
                Ok(new_path) => {
                    results.rename_first(&old_path, &new_path);
                    sink.record(&SearchEvent::ItemRenamed {
                        from: old_path.clone(),
                        to: new_path.clone(),
                    });
                    report.succeed(old_path, Some(new_path));
                }
                Err(failure) => report.fail(
                    ItemOperationError::new(old_path, BatchOperation::Rename, failure),
                    sink,
                ),
            }
        }

        report
    }

    fn rename_one(old_path: &Path, pattern: &RenamePattern, counter: usize) -> Result<PathBuf, ItemFailure> {
        let stem = old_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = old_path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let new_name = pattern.expand(&stem, &ext, counter)?;
        if new_name.is_empty() || new_name == "." || new_name == ".." {
            return Err(ItemFailure::Template(format!("'{new_name}' is not a file name")));
        }
        if new_name.contains(std::path::is_separator) {
            return Err(ItemFailure::Template(format!(
                "'{new_name}' would move the file out of its directory"
            )));
        }

        let new_path = old_path.with_file_name(&new_name);
        if new_path != old_path && fs::symlink_metadata(&new_path).is_ok() {
            return Err(ItemFailure::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", new_path.display()),
            )));
        }

        fs::rename(old_path, &new_path)?;
        Ok(new_path)
    }

    /// Copies each selected file into `destination`, keeping its permissions
    /// and timestamps. Existing files of the same name are overwritten.
    ///
    /// Fails up front if `destination` is not a directory.
    pub fn copy(
        selection: &[PathBuf],
        destination: &Path,
        sink: &dyn DiagnosticsSink,
    ) -> Result<BatchReport, CoreError> {
        validate_root(destination)?;
        let mut report = BatchReport::default();

        for source in dedupe_paths(selection.iter().cloned()) {
            match Self::copy_one(&source, destination) {
                Ok(target) => {
                    sink.record(&SearchEvent::ItemCopied {
                        from: source.clone(),
                        to: target.clone(),
                    });
                    report.succeed(source, Some(target));
                }
                Err(failure) => report.fail(
                    ItemOperationError::new(source, BatchOperation::Copy, failure),
                    sink,
                ),
            }
        }

        Ok(report)
    }

    fn copy_one(source: &Path, destination: &Path) -> Result<PathBuf, ItemFailure> {
        let metadata = fs::metadata(source)?;
        if metadata.is_dir() {
            return Err(ItemFailure::Unsupported(
                "directories cannot be copied".to_string(),
            ));
        }
        let file_name = source.file_name().ok_or_else(|| {
            ItemFailure::Unsupported("path has no file name".to_string())
        })?;

        let target = destination.join(file_name);
        if is_same_file(source, &target) {
            return Err(ItemFailure::Unsupported(
                "source and destination are the same file".to_string(),
            ));
        }
        fs::copy(source, &target)?;

        let mut times = fs::FileTimes::new();
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        // The copy may already carry a read-only mode; timestamps only need ownership.
        fs::File::open(&target)?.set_times(times)?;

        Ok(target)
    }

    /// Deletes each selected path. Directories are removed recursively.
    /// Irreversible.
    pub fn delete(
        selection: &[PathBuf],
        results: &mut ResultSet,
        sink: &dyn DiagnosticsSink,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for path in dedupe_paths(selection.iter().cloned()) {
            match Self::delete_one(&path) {
                Ok(was_directory) => {
                    results.remove_first(&path);
                    sink.record(&SearchEvent::ItemDeleted {
                        path: path.clone(),
                        was_directory,
                    });
                    report.succeed(path, None);
                }
                Err(failure) => report.fail(
                    ItemOperationError::new(path, BatchOperation::Delete, failure),
                    sink,
                ),
            }
        }

        report
    }

    fn delete_one(path: &Path) -> Result<bool, ItemFailure> {
        // Not following links: a symlink is removed, never its target.
        let file_type = fs::symlink_metadata(path)?.file_type();
        if file_type.is_dir() {
            fs::remove_dir_all(path)?;
            Ok(true)
        } else {
            fs::remove_file(path)?;
            Ok(false)
        }
    }
}

/// `true` when `a` and `b` are the same file on disk, hard links included.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::{MemorySink, NullSink};
    use crate::core::results::SearchResult;
    use crate::core::search::{NameQuery, SearchEngine};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "alpha\nhello\n").unwrap();
        fs::write(&b, "beta\n").unwrap();
        (temp, a, b)
    }

    #[test]
    fn dedupe_keeps_first_seen_order() {
        let paths = ["b", "a", "b", "c", "a"].map(PathBuf::from);
        assert_eq!(dedupe_paths(paths), ["b", "a", "c"].map(PathBuf::from).to_vec());
    }

    #[test]
    fn pattern_expansion() {
        let pattern = RenamePattern::new("{name}_{counter:03}.{ext}");
        assert_eq!(pattern.expand("photo", "jpg", 7).unwrap(), "photo_007.jpg");
        assert_eq!(
            RenamePattern::new("{{{name}}}").expand("x", "", 1).unwrap(),
            "{x}"
        );
        assert_eq!(
            RenamePattern::new("{name}_{counter}{ext}").expand("a", "txt", 1).unwrap(),
            "a_1txt"
        );
    }

    #[test]
    fn pattern_errors() {
        for template in ["{nam}", "{name", "name}", "{counter:x}", "{name:5}"] {
            assert!(
                matches!(
                    RenamePattern::new(template).expand("a", "b", 1),
                    Err(ItemFailure::Template(_))
                ),
                "{template} should not expand"
            );
        }
    }

    #[test]
    fn rename_dedupes_and_updates_rows_once() {
        let (temp, a, b) = setup();
        let mut results: ResultSet = [
            SearchResult::name_match(a.clone()),
            SearchResult::line_match(a.clone(), 2, "hello"),
            SearchResult::name_match(b.clone()),
        ]
        .into_iter()
        .collect();

        let selection = vec![a.clone(), a.clone(), b.clone()];
        let pattern = RenamePattern::new("{name}_{counter}.{ext}");
        let report = BatchProcessor::rename(&selection, &pattern, &mut results, &NullSink);

        assert!(report.is_clean());
        assert_eq!(report.completed.len(), 2);
        let a1 = temp.path().join("a_1.txt");
        let b2 = temp.path().join("b_2.txt");
        assert!(a1.exists() && b2.exists());
        assert!(!a.exists() && !b.exists());

        assert_eq!(results.rows()[0].path, a1);
        assert_eq!(results.rows()[0].name, "a_1.txt");
        // Only the first row per path is reconciled.
        assert_eq!(results.rows()[1].path, a);
        assert_eq!(results.rows()[2].path, b2);
    }

    #[test]
    fn rename_failure_is_isolated() {
        let (temp, _a, b) = setup();
        let missing = temp.path().join("missing.txt");
        let mut results: ResultSet = [
            SearchResult::name_match(missing.clone()),
            SearchResult::name_match(b.clone()),
        ]
        .into_iter()
        .collect();

        let sink = MemorySink::new();
        let report = BatchProcessor::rename(
            &[missing.clone(), b.clone()],
            &RenamePattern::new("renamed_{counter}.{ext}"),
            &mut results,
            &sink,
        );

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, missing);
        assert_eq!(report.failed[0].operation, BatchOperation::Rename);
        assert_eq!(report.completed.len(), 1);
        assert!(temp.path().join("renamed_2.txt").exists());
        assert_eq!(results.rows()[0].path, missing);
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, SearchEvent::ItemFailed { path, .. } if *path == missing)));
    }

    #[test]
    fn rename_never_overwrites_or_leaves_directory() {
        let (temp, a, b) = setup();
        let mut results = ResultSet::new();

        let report = BatchProcessor::rename(&[a.clone()], &RenamePattern::new("b.{ext}"), &mut results, &NullSink);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(fs::read_to_string(&b).unwrap(), "beta\n");

        let report = BatchProcessor::rename(&[a.clone()], &RenamePattern::new("../{name}"), &mut results, &NullSink);
        assert_eq!(report.failed.len(), 1);
        assert!(a.exists());
        assert!(!temp.path().parent().unwrap().join("a").exists());
    }

    #[test]
    fn renamed_file_is_found_again() {
        let (temp, a, _b) = setup();
        let root = temp.path();
        let query = NameQuery {
            pattern: "a.txt".to_string(),
            ..Default::default()
        };
        let mut results = SearchEngine::search_files(root, &query, &NullSink).unwrap().results;

        BatchProcessor::rename(&[a], &RenamePattern::new("archived_{name}.{ext}"), &mut results, &NullSink);

        let query = NameQuery {
            pattern: "archived_a".to_string(),
            ..Default::default()
        };
        let again = SearchEngine::search_files(root, &query, &NullSink).unwrap().results;
        assert_eq!(again.rows(), results.rows());
        assert_eq!(again.rows()[0].name, "archived_a.txt");
        assert!(again.rows()[0].match_text.is_empty());
    }

    #[test]
    fn copy_preserves_content_and_mtime() {
        let (temp, a, b) = setup();
        let old = SystemTime::now() - Duration::from_secs(3600 * 24 * 10);
        fs::File::options().write(true).open(&a).unwrap().set_modified(old).unwrap();

        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        let report = BatchProcessor::copy(&[a.clone(), b.clone(), a.clone()], &dest, &NullSink).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.completed.len(), 2);
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "alpha\nhello\n");
        let copied_mtime = fs::metadata(dest.join("a.txt")).unwrap().modified().unwrap();
        let delta = copied_mtime
            .duration_since(old)
            .unwrap_or_else(|e| e.duration());
        assert!(delta < Duration::from_secs(2));
        assert!(a.exists(), "copy must not move the source");
    }

    #[test]
    fn copy_rejects_directories_and_missing_sources_per_item() {
        let (temp, a, _b) = setup();
        let dest = temp.path().join("dest");
        let folder = temp.path().join("folder");
        fs::create_dir(&dest).unwrap();
        fs::create_dir(&folder).unwrap();

        let report = BatchProcessor::copy(
            &[folder.clone(), temp.path().join("gone.txt"), a],
            &dest,
            &NullSink,
        )
        .unwrap();
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.completed.len(), 1);
        assert!(dest.join("a.txt").exists());
    }

    #[test]
    fn copy_requires_destination_directory() {
        let (temp, a, _b) = setup();
        let err = BatchProcessor::copy(&[a], &temp.path().join("nowhere"), &NullSink).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDirectory(_)));
    }

    #[test]
    fn copy_into_own_directory_leaves_source_intact() {
        let (temp, a, _b) = setup();
        fs::write(&a, "precious data\n").unwrap();

        let sink = MemorySink::new();
        let report = BatchProcessor::copy(&[a.clone()], temp.path(), &sink).unwrap();

        assert!(report.completed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].source, ItemFailure::Unsupported(_)));
        assert_eq!(fs::read_to_string(&a).unwrap(), "precious data\n");
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, SearchEvent::ItemFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn copy_of_read_only_file_succeeds_and_keeps_mtime() {
        use std::os::unix::fs::PermissionsExt;

        if crate::utils::test_helpers::running_as_root() {
            eprintln!("skipping: root ignores file permissions");
            return;
        }

        let (temp, a, _b) = setup();
        let old = SystemTime::now() - Duration::from_secs(3600 * 24 * 3);
        fs::File::options().write(true).open(&a).unwrap().set_modified(old).unwrap();
        fs::set_permissions(&a, fs::Permissions::from_mode(0o444)).unwrap();

        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        let report = BatchProcessor::copy(&[a.clone()], &dest, &NullSink).unwrap();

        assert!(report.is_clean(), "unexpected failures: {:?}", report.failed);
        let copied = dest.join("a.txt");
        assert_eq!(fs::metadata(&copied).unwrap().permissions().mode() & 0o777, 0o444);
        let delta = fs::metadata(&copied)
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(old)
            .unwrap_or_else(|e| e.duration());
        assert!(delta < Duration::from_secs(2));
    }

    #[test]
    fn delete_removes_files_and_directories_and_rows() {
        let (temp, a, b) = setup();
        let folder = temp.path().join("folder");
        fs::create_dir_all(folder.join("inner")).unwrap();
        fs::write(folder.join("inner/x.txt"), "x").unwrap();

        let mut results: ResultSet = [a.clone(), folder.clone(), b.clone()]
            .into_iter()
            .map(SearchResult::name_match)
            .collect();
        let sink = MemorySink::new();
        let report = BatchProcessor::delete(&[a.clone(), folder.clone()], &mut results, &sink);

        assert!(report.is_clean());
        assert!(!a.exists() && !folder.exists());
        assert_eq!(results.len(), 1);
        assert_eq!(results.rows()[0].path, b);
        assert!(sink.events().contains(&SearchEvent::ItemDeleted {
            path: folder,
            was_directory: true
        }));
    }

    #[test]
    fn deleting_vanished_file_keeps_its_row() {
        let (_temp, a, b) = setup();
        let mut results: ResultSet = [a.clone(), b.clone()]
            .into_iter()
            .map(SearchResult::name_match)
            .collect();
        fs::remove_file(&a).unwrap();

        let report = BatchProcessor::delete(&[a.clone(), b.clone()], &mut results, &NullSink);

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, a);
        assert_eq!(report.failed[0].operation, BatchOperation::Delete);
        assert_eq!(results.len(), 1);
        assert_eq!(results.rows()[0].path, a);
        assert!(!b.exists());
    }
}
