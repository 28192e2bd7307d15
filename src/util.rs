//! Small helpers shared across modules.

use std::path::{Path, PathBuf};

/// Case-insensitive `str::ends_with`.
pub fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// File name of `path` for log lines, falling back to the whole path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Lists the regular files directly inside `dir` whose name ends with one of
/// `suffixes` (case-insensitive), sorted by path.
pub(crate) fn list_files_with_suffix(
    dir: &Path,
    suffixes: &[&str],
) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if suffixes.iter().any(|s| ends_with_ignore_case(name, s)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_with_ignore_case() {
        assert!(ends_with_ignore_case("a.ZIP", ".zip"));
        assert!(ends_with_ignore_case("b.zip", ".ZIP"));
        assert!(!ends_with_ignore_case("c.tar", ".zip"));
        assert!(!ends_with_ignore_case("zip", ".zip"));
    }

    #[test]
    fn test_list_files_with_suffix_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.EPW", "a.epw", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.epw")).unwrap();

        let files = list_files_with_suffix(dir.path(), &[".epw"]).unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.epw", "b.EPW"]);
    }
}
