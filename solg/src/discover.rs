use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use crate::category;

/// Finds project files under the directory specified recursively.
/// Only extensions of known project types are considered.
/// Result is sorted so that discovery order never affects output.
#[must_use]
pub fn project_files<P: AsRef<Path>>(path: P) -> Vec<PathBuf> {
    let parallelism = Parallelism::RayonNewPool(num_cpus::get_physical());
    let root = decorate_path(path.as_ref());
    let mut files = WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(parallelism)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|f| f.file_type().is_file())
        .map(|f| f.path())
        .filter(|p| {
            p.extension()
                .is_some_and(|e| category::is_known_extension(&e.to_string_lossy()))
        })
        .collect::<Vec<_>>();
    files.sort();
    tracing::debug!(
        path = %path.as_ref().display(),
        count = files.len(),
        "project files discovered"
    );
    files
}

/// On Windows trailing back slash (\) to be added if volume and colon passed (like c:).
/// It needed paths look to be more pleasant
#[cfg(target_os = "windows")]
fn decorate_path(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.len() == 2 && s.ends_with(':') {
        PathBuf::from(format!("{s}\\"))
    } else {
        path.to_path_buf()
    }
}

/// On Unix just passthrough as is
#[cfg(not(target_os = "windows"))]
fn decorate_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
