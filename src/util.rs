use glob::glob;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use cheatsheet::Result;

/// Expands every input into existing files, keeping each path once.
///
/// Glob patterns match files only. Plain paths that do not exist are
/// reported and left out.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();

    for input in inputs {
        if is_glob_pattern(input) {
            for expanded_path in expand_single_glob(input)? {
                if expanded_path.is_file() && seen.insert(expanded_path.clone()) {
                    result.push(expanded_path);
                }
            }
        } else {
            add_if_exists(Path::new(input), &mut result, &mut seen);
        }
    }

    result.sort();
    Ok(result)
}

fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}

fn expand_single_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern)?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(paths)
}

fn add_if_exists(path: &Path, result: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
    if !path.exists() {
        eprintln!("Warning: Input file '{}' does not exist", path.display());
    } else if seen.insert(path.to_path_buf()) {
        result.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn globs_and_plain_paths_are_merged_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.xml");
        let b = dir.path().join("b.xml");
        fs::write(&a, "<compositeCheatsheet/>").unwrap();
        fs::write(&b, "<compositeCheatsheet/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let pattern = dir.path().join("*.xml").to_string_lossy().to_string();
        let inputs = vec![
            b.to_string_lossy().to_string(),
            pattern,
            dir.path().join("missing.xml").to_string_lossy().to_string(),
        ];

        let paths = expand_inputs(&inputs).unwrap();
        assert_eq!(paths, vec![a, b]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(expand_inputs(&["[".to_string()]).is_err());
    }
}
