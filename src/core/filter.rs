//! Size and modification-time filtering over an existing result set.
//!
//! Filtering never re-searches and never drops rows. It produces a visibility
//! mask from fresh filesystem metadata. Directories always stay visible, and
//! so does any row whose path can no longer be inspected.

use super::diagnostics::{DiagnosticsSink, SearchEvent};
use super::results::ResultSet;
use super::CoreError;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The filter selector, without its value. Serialized with the labels users
/// see so saved queries stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    #[default]
    #[serde(rename = "None")]
    None,
    #[serde(rename = "Size (KB) >")]
    SizeGreaterThan,
    #[serde(rename = "Size (KB) <")]
    SizeLessThan,
    #[serde(rename = "Date Modified (YYYY-MM-DD) >")]
    ModifiedAfter,
    #[serde(rename = "Date Modified (YYYY-MM-DD) <")]
    ModifiedBefore,
}

impl FilterKind {
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::None => "None",
            FilterKind::SizeGreaterThan => "Size (KB) >",
            FilterKind::SizeLessThan => "Size (KB) <",
            FilterKind::ModifiedAfter => "Date Modified (YYYY-MM-DD) >",
            FilterKind::ModifiedBefore => "Date Modified (YYYY-MM-DD) <",
        }
    }
}

/// A validated filter. Sizes are in kilobytes (1 KB = 1024 bytes); dates are
/// local midnight of the given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterCriterion {
    None,
    SizeGreaterThan(f64),
    SizeLessThan(f64),
    ModifiedAfter(DateTime<Local>),
    ModifiedBefore(DateTime<Local>),
}

impl FilterCriterion {
    /// Validates `value` for `kind`. The value is ignored for `FilterKind::None`.
    pub fn parse(kind: FilterKind, value: &str) -> Result<Self, CoreError> {
        if kind == FilterKind::None {
            return Ok(FilterCriterion::None);
        }

        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::FilterValidation(format!(
                "a value is required for '{}'",
                kind.label()
            )));
        }

        Ok(match kind {
            FilterKind::None => FilterCriterion::None,
            FilterKind::SizeGreaterThan => FilterCriterion::SizeGreaterThan(parse_kilobytes(value)?),
            FilterKind::SizeLessThan => FilterCriterion::SizeLessThan(parse_kilobytes(value)?),
            FilterKind::ModifiedAfter => FilterCriterion::ModifiedAfter(parse_date(value)?),
            FilterKind::ModifiedBefore => FilterCriterion::ModifiedBefore(parse_date(value)?),
        })
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterCriterion::None => FilterKind::None,
            FilterCriterion::SizeGreaterThan(_) => FilterKind::SizeGreaterThan,
            FilterCriterion::SizeLessThan(_) => FilterKind::SizeLessThan,
            FilterCriterion::ModifiedAfter(_) => FilterKind::ModifiedAfter,
            FilterCriterion::ModifiedBefore(_) => FilterKind::ModifiedBefore,
        }
    }

    /// Whether a regular file with this metadata stays visible.
    fn keeps(&self, metadata: &fs::Metadata) -> bool {
        let size = metadata.len() as f64;
        match self {
            FilterCriterion::None => true,
            FilterCriterion::SizeGreaterThan(kb) => size > kb * 1024.0,
            FilterCriterion::SizeLessThan(kb) => size < kb * 1024.0,
            FilterCriterion::ModifiedAfter(date) => match metadata.modified() {
                Ok(mtime) => DateTime::<Local>::from(mtime) > *date,
                Err(_) => true,
            },
            FilterCriterion::ModifiedBefore(date) => match metadata.modified() {
                Ok(mtime) => DateTime::<Local>::from(mtime) < *date,
                Err(_) => true,
            },
        }
    }
}

impl std::fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterCriterion::None => f.write_str("None"),
            FilterCriterion::SizeGreaterThan(kb) | FilterCriterion::SizeLessThan(kb) => {
                write!(f, "{} {}", self.kind().label(), kb)
            }
            FilterCriterion::ModifiedAfter(date) | FilterCriterion::ModifiedBefore(date) => {
                write!(f, "{} {}", self.kind().label(), date.format(DATE_FORMAT))
            }
        }
    }
}

fn parse_kilobytes(value: &str) -> Result<f64, CoreError> {
    match value.parse::<f64>() {
        Ok(kb) if kb.is_finite() => Ok(kb),
        _ => Err(CoreError::FilterValidation(format!(
            "'{value}' is not a valid size in KB"
        ))),
    }
}

fn parse_date(value: &str) -> Result<DateTime<Local>, CoreError> {
    let invalid = || CoreError::FilterValidation(format!("'{value}' is not a date in YYYY-MM-DD form"));
    let day = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    let midnight = day.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(invalid)
}

/// Computes the visibility mask for `results` under `criterion`.
///
/// Metadata is read fresh for every row. Re-applying `FilterCriterion::None`
/// always yields an all-visible mask.
pub fn visibility_mask(results: &ResultSet, criterion: &FilterCriterion) -> Vec<bool> {
    results
        .rows()
        .iter()
        .map(|row| row_visible(&row.path, criterion))
        .collect()
}

fn row_visible(path: &Path, criterion: &FilterCriterion) -> bool {
    if *criterion == FilterCriterion::None {
        return true;
    }
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => criterion.keeps(&metadata),
        // Directories, special files and vanished paths stay visible.
        _ => true,
    }
}

/// Applies `criterion` to `results` in place and reports it to `sink`.
pub fn apply_filter(results: &mut ResultSet, criterion: &FilterCriterion, sink: &dyn DiagnosticsSink) {
    let mask = visibility_mask(results, criterion);
    let hidden = mask.iter().filter(|visible| !**visible).count();
    results.set_visibility(mask);

    if *criterion == FilterCriterion::None {
        sink.record(&SearchEvent::FilterReset);
    } else {
        sink.record(&SearchEvent::FilterApplied {
            criterion: *criterion,
            hidden,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::{MemorySink, NullSink};
    use crate::core::results::SearchResult;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_sized(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![b'x'; bytes]).unwrap();
        path
    }

    fn set_mtime(path: &Path, when: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(when)
            .unwrap();
    }

    fn fixture() -> (TempDir, ResultSet) {
        let temp = tempfile::tempdir().unwrap();
        let small = write_sized(temp.path(), "small.bin", 3 * 1024);
        let large = write_sized(temp.path(), "large.bin", 10 * 1024);
        let folder = temp.path().join("folder");
        fs::create_dir(&folder).unwrap();
        let set = [small, large, folder]
            .into_iter()
            .map(SearchResult::name_match)
            .collect();
        (temp, set)
    }

    #[test]
    fn size_greater_than_hides_small_files_but_never_directories() {
        let (_temp, mut set) = fixture();
        let criterion = FilterCriterion::parse(FilterKind::SizeGreaterThan, "5").unwrap();
        apply_filter(&mut set, &criterion, &NullSink);
        assert_eq!(set.visibility(), &[false, true, true]);
    }

    #[test]
    fn size_less_than_is_strict() {
        let (_temp, set) = fixture();
        let criterion = FilterCriterion::parse(FilterKind::SizeLessThan, "3").unwrap();
        assert_eq!(visibility_mask(&set, &criterion), vec![false, false, true]);
    }

    #[test]
    fn none_restores_full_visibility() {
        let (_temp, mut set) = fixture();
        let before = visibility_mask(&set, &FilterCriterion::None);
        let criterion = FilterCriterion::parse(FilterKind::SizeGreaterThan, "100").unwrap();
        apply_filter(&mut set, &criterion, &NullSink);
        assert!(set.visibility().contains(&false));

        apply_filter(&mut set, &FilterCriterion::None, &NullSink);
        assert_eq!(set.visibility(), before.as_slice());
        assert!(set.visibility().iter().all(|v| *v));
    }

    #[test]
    fn modification_date_bounds() {
        let (temp, set) = fixture();
        let old = SystemTime::now() - Duration::from_secs(60 * 60 * 24 * 400);
        set_mtime(&temp.path().join("small.bin"), old);

        let cutoff = (Local::now() - chrono::Duration::days(30))
            .format(DATE_FORMAT)
            .to_string();

        let after = FilterCriterion::parse(FilterKind::ModifiedAfter, &cutoff).unwrap();
        assert_eq!(visibility_mask(&set, &after), vec![false, true, true]);

        let before = FilterCriterion::parse(FilterKind::ModifiedBefore, &cutoff).unwrap();
        assert_eq!(visibility_mask(&set, &before), vec![true, false, true]);
    }

    #[test]
    fn vanished_paths_fail_open() {
        let (temp, set) = fixture();
        fs::remove_file(temp.path().join("large.bin")).unwrap();
        let criterion = FilterCriterion::parse(FilterKind::SizeGreaterThan, "5").unwrap();
        assert_eq!(visibility_mask(&set, &criterion), vec![false, true, true]);
    }

    #[test]
    fn bad_values_are_rejected() {
        for (kind, value) in [
            (FilterKind::SizeGreaterThan, "five"),
            (FilterKind::SizeLessThan, ""),
            (FilterKind::SizeLessThan, "inf"),
            (FilterKind::ModifiedAfter, "2024/01/01"),
            (FilterKind::ModifiedBefore, "2024-13-01"),
        ] {
            assert!(
                matches!(FilterCriterion::parse(kind, value), Err(CoreError::FilterValidation(_))),
                "{kind:?} {value:?} should be rejected"
            );
        }
        assert_eq!(
            FilterCriterion::parse(FilterKind::None, "garbage").unwrap(),
            FilterCriterion::None
        );
    }

    #[test]
    fn reports_hidden_count() {
        let (_temp, mut set) = fixture();
        let sink = MemorySink::new();
        let criterion = FilterCriterion::parse(FilterKind::SizeGreaterThan, "5").unwrap();
        apply_filter(&mut set, &criterion, &sink);
        apply_filter(&mut set, &FilterCriterion::None, &sink);
        assert_eq!(
            sink.events(),
            vec![
                SearchEvent::FilterApplied {
                    criterion,
                    hidden: 1
                },
                SearchEvent::FilterReset
            ]
        );
    }

    #[test]
    fn kinds_use_display_labels_in_json() {
        let json = serde_json::to_string(&FilterKind::ModifiedAfter).unwrap();
        assert_eq!(json, "\"Date Modified (YYYY-MM-DD) >\"");
        let kind: FilterKind = serde_json::from_str("\"Size (KB) <\"").unwrap();
        assert_eq!(kind, FilterKind::SizeLessThan);
    }
}
