use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::error::{Result, ToolError};

/// Patterns used when the caller does not supply one.
pub const DEFAULT_PATTERNS: &[&str] = &["*.xlsx", "*.xls", "*.xlsm"];

/// Prefix of the lock files office suites leave next to open workbooks.
pub const LOCK_FILE_PREFIX: &str = "~$";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Lists the files directly inside `folder` whose name matches `pattern`
/// (or one of [`DEFAULT_PATTERNS`]), skipping lock files. Paths are sorted so
/// repeated runs merge in the same order.
pub fn list_input_files(folder: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ToolError::MissingInput(folder.to_path_buf()));
    }

    let patterns = match pattern {
        Some(pattern) => vec![Pattern::new(pattern)?],
        None => DEFAULT_PATTERNS
            .iter()
            .map(|pattern| Pattern::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(folder = %folder.display(), %error, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            warn!(file = %path.display(), "ignoring file with a non UTF-8 name");
            continue;
        };
        if name.starts_with(LOCK_FILE_PREFIX) {
            debug!(file = name, "ignoring lock file");
            continue;
        }
        if patterns
            .iter()
            .any(|pattern| pattern.matches_with(name, MATCH_OPTIONS))
        {
            files.push(path);
        }
    }

    files.sort();
    debug!(folder = %folder.display(), file_count = files.len(), "discovered input files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").expect("file written");
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn default_patterns_pick_excel_files_and_skip_lock_files() {
        let dir = tempdir().expect("temporary directory");
        for name in ["b.xlsx", "a.XLS", "c.xlsm", "~$b.xlsx", "notes.txt", "data.csv"] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        let files = list_input_files(dir.path(), None).expect("listing");

        assert_eq!(names(&files), vec!["a.XLS", "b.xlsx", "c.xlsm"]);
    }

    #[test]
    fn explicit_pattern_replaces_defaults() {
        let dir = tempdir().expect("temporary directory");
        for name in ["sales_jan.csv", "sales_feb.csv", "stock.csv", "sales.xlsx", "~$sales_x.csv"] {
            touch(dir.path(), name);
        }

        let files = list_input_files(dir.path(), Some("sales_*.csv")).expect("listing");

        assert_eq!(names(&files), vec!["sales_feb.csv", "sales_jan.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().expect("temporary directory");
        touch(dir.path(), "a.xlsx");
        let odd = dir.path().join(OsStr::from_bytes(b"b\xff.xlsx"));
        if fs::write(&odd, b"").is_err() {
            return;
        }

        let files = list_input_files(dir.path(), None).expect("listing");

        assert_eq!(names(&files), vec!["a.xlsx"]);
    }

    #[test]
    fn missing_folder_is_reported() {
        let dir = tempdir().expect("temporary directory");
        let error = list_input_files(&dir.path().join("absent"), None).unwrap_err();
        assert!(matches!(error, ToolError::MissingInput(_)));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let dir = tempdir().expect("temporary directory");
        let error = list_input_files(dir.path(), Some("[")).unwrap_err();
        assert!(matches!(error, ToolError::Pattern(_)));
    }
}
