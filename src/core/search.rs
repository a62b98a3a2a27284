//! Name search and content search over a directory tree.

use super::diagnostics::{DiagnosticsSink, SearchEvent, SearchKind};
use super::encoding::{decode_lossy, detect_encoding, split_lines};
use super::error::ReadError;
use super::matcher::Matcher;
use super::results::{ResultSet, SearchResult};
use super::walker::{collect_all_files, validate_root, TreeWalker};
use super::CoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters for a name search.
#[derive(Debug, Clone, Default)]
pub struct NameQuery {
    pub pattern: String,
    /// Allowed name suffixes such as `.txt`. Empty means "any".
    pub extensions: Vec<String>,
    pub use_regex: bool,
}

impl NameQuery {
    /// `true` when the query narrows the candidate set for content search.
    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty() || !self.extensions.is_empty()
    }
}

/// Output of a name search: display rows, and the matched files that are
/// eligible for a follow-up content search. Directories only appear in `results`.
#[derive(Debug, Clone, Default)]
pub struct FileSearch {
    pub results: ResultSet,
    pub file_paths: Vec<PathBuf>,
}

/// A utility struct for searching directory trees.
///
/// This struct is stateless and provides methods as associated functions.
pub struct SearchEngine;

impl SearchEngine {
    /// Matches file and directory names under `root` against `query`.
    ///
    /// Files must also pass the extension filter. Directories are only
    /// considered while no extension filter is set. An invalid pattern aborts
    /// the search before any row is produced.
    pub fn search_files(
        root: &Path,
        query: &NameQuery,
        sink: &dyn DiagnosticsSink,
    ) -> Result<FileSearch, CoreError> {
        sink.record(&SearchEvent::SearchStarted {
            kind: SearchKind::Name,
            root: root.to_path_buf(),
            pattern: query.pattern.clone(),
            use_regex: query.use_regex,
        });

        let found = Self::scan_names(root, query, SearchKind::Name, sink)?;
        Self::report_finished(SearchKind::Name, found.results.len(), sink);
        Ok(found)
    }

    /// Picks the files a content search should read.
    ///
    /// With an active name query these are exactly the files a name search
    /// would return; otherwise every file under `root`.
    pub fn content_candidates(
        root: &Path,
        query: &NameQuery,
        sink: &dyn DiagnosticsSink,
    ) -> Result<Vec<PathBuf>, CoreError> {
        if query.is_active() {
            Ok(Self::scan_names(root, query, SearchKind::Name, sink)?.file_paths)
        } else {
            collect_all_files(root)
        }
    }

    /// Runs a complete content search: candidate selection, then line matching.
    pub fn search_tree_content(
        root: &Path,
        names: &NameQuery,
        content_pattern: &str,
        use_regex: bool,
        sink: &dyn DiagnosticsSink,
    ) -> Result<ResultSet, CoreError> {
        sink.record(&SearchEvent::SearchStarted {
            kind: SearchKind::Content,
            root: root.to_path_buf(),
            pattern: content_pattern.to_string(),
            use_regex,
        });

        // Fail on a bad root or content pattern before walking anything.
        validate_root(root)?;
        let matcher = Self::compile(content_pattern, use_regex, SearchKind::Content, sink)?;
        let candidates = Self::content_candidates(root, names, sink)?;
        let results = Self::match_lines(&candidates, &matcher, sink);
        Self::report_finished(SearchKind::Content, results.len(), sink);
        Ok(results)
    }

    /// Matches every line of every candidate file against `pattern`.
    ///
    /// Each matching line becomes one row, `"{line}: {trimmed text}"`, with
    /// 1-based line numbers. Files that cannot be read are reported and
    /// skipped; only an invalid pattern fails the whole call.
    pub fn search_content(
        candidates: &[PathBuf],
        pattern: &str,
        use_regex: bool,
        sink: &dyn DiagnosticsSink,
    ) -> Result<ResultSet, CoreError> {
        let matcher = Self::compile(pattern, use_regex, SearchKind::Content, sink)?;
        let results = Self::match_lines(candidates, &matcher, sink);
        Self::report_finished(SearchKind::Content, results.len(), sink);
        Ok(results)
    }

    /// `true` if `extensions` is empty or `name` ends with one of them.
    pub fn matches_extension(name: &str, extensions: &[String]) -> bool {
        extensions.is_empty() || extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    fn compile(
        pattern: &str,
        use_regex: bool,
        kind: SearchKind,
        sink: &dyn DiagnosticsSink,
    ) -> Result<Matcher, CoreError> {
        Matcher::new(pattern, use_regex).inspect_err(|err| {
            if let CoreError::Match { pattern, message } = err {
                sink.record(&SearchEvent::InvalidPattern {
                    kind,
                    pattern: pattern.clone(),
                    message: message.clone(),
                });
            }
        })
    }

    fn scan_names(
        root: &Path,
        query: &NameQuery,
        kind: SearchKind,
        sink: &dyn DiagnosticsSink,
    ) -> Result<FileSearch, CoreError> {
        let walker = TreeWalker::new(root)?;
        let matcher = Self::compile(&query.pattern, query.use_regex, kind, sink)?;
        let include_dirs = query.extensions.is_empty();
        let mut found = FileSearch::default();

        for level in walker {
            for name in &level.files {
                if matcher.is_match(name) && Self::matches_extension(name, &query.extensions) {
                    let path = level.dir.join(name);
                    found.results.push(SearchResult::name_match(path.clone()));
                    found.file_paths.push(path);
                }
            }

            if include_dirs {
                for name in &level.subdirs {
                    if matcher.is_match(name) {
                        found
                            .results
                            .push(SearchResult::name_match(level.dir.join(name)));
                    }
                }
            }
        }

        Ok(found)
    }

    fn match_lines(candidates: &[PathBuf], matcher: &Matcher, sink: &dyn DiagnosticsSink) -> ResultSet {
        let mut results = ResultSet::new();

        for path in candidates {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    sink.record(&SearchEvent::FileSkipped(ReadError {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                    continue;
                }
            };

            let text = decode_lossy(&bytes, detect_encoding(&bytes));
            for (index, line) in split_lines(&text).enumerate() {
                if matcher.is_match(line) {
                    results.push(SearchResult::line_match(path.clone(), index + 1, line));
                }
            }
        }

        results
    }

    fn report_finished(kind: SearchKind, rows: usize, sink: &dyn DiagnosticsSink) {
        sink.record(&SearchEvent::SearchFinished { kind, rows });
        if rows == 0 {
            sink.record(&SearchEvent::NoResults { kind });
        }
    }
}
