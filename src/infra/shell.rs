//! Locating external executables.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Find an executable by name on PATH. An argument containing a path
/// separator is treated as an explicit location and only checked for
/// existence.
pub fn find_bin(command: &str) -> Option<PathBuf> {
    let path = Path::new(command);
    if path.components().count() > 1 && path.is_file() {
        return Some(path.to_path_buf());
    }

    let candidate_names = candidate_names(command);
    for dir in collect_search_paths() {
        for name in &candidate_names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    None
}

fn collect_search_paths() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|env_path| std::env::split_paths(&env_path).collect())
        .unwrap_or_default()
}

#[cfg(target_os = "windows")]
fn candidate_names(command: &str) -> Vec<OsString> {
    let mut names = vec![OsString::from(command)];
    if Path::new(command).extension().is_none() {
        let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
        for ext in exts.split(';') {
            let ext = ext.trim();
            if ext.is_empty() {
                continue;
            }
            let mut name = OsString::from(command);
            name.push(ext.to_ascii_lowercase());
            names.push(name);
        }
    }
    names
}

#[cfg(not(target_os = "windows"))]
fn candidate_names(command: &str) -> Vec<OsString> {
    vec![OsString::from(command)]
}
