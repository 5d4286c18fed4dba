use std::path::{Component, Path, PathBuf};

/// Directory part of the path or empty path
#[must_use]
pub fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Joins solution relative path (which uses Windows separators) to the directory specified
#[must_use]
#[cfg(not(target_os = "windows"))]
pub fn make_path(dir: &Path, relative: &str) -> PathBuf {
    // Converts all possible Windows paths into Unix ones
    let joined = relative
        .split('\\')
        .filter(|s| !s.is_empty())
        .fold(PathBuf::from(dir), |pb, s| pb.join(s));
    normalize(&joined)
}

#[must_use]
#[cfg(target_os = "windows")]
pub fn make_path(dir: &Path, relative: &str) -> PathBuf {
    normalize(&PathBuf::from(dir).join(relative))
}

/// Removes `.` and resolves `..` components lexically without touching file system
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            c => result.push(c),
        }
    }
    result
}

/// Path of `target` relative to `base` directory written with Windows separators
/// as solution files expect. Falls back to the target itself when paths have no
/// common root (different drives for example).
#[must_use]
pub fn relative_to(base: &Path, target: &Path) -> String {
    let base = normalize(base);
    let target = normalize(target);
    let base_parts = base.components().collect::<Vec<_>>();
    let target_parts = target.components().collect::<Vec<_>>();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(b, t)| same_component(b, t))
        .count();

    let rooted = |parts: &[Component]| parts.first().is_some_and(|c| !is_normal(c));
    if common == 0 && (rooted(&base_parts) || rooted(&target_parts)) {
        return to_windows_separators(&target);
    }

    let ups = std::iter::repeat_n("..".to_owned(), base_parts.len() - common);
    let downs = target_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    ups.chain(downs).collect::<Vec<_>>().join("\\")
}

/// Case insensitive lookup key of the path
#[must_use]
pub fn path_key(path: &Path) -> String {
    normalize(path)
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

/// Compares path components ignoring case
#[must_use]
pub fn same_component(left: &Component, right: &Component) -> bool {
    left.as_os_str()
        .to_string_lossy()
        .eq_ignore_ascii_case(&right.as_os_str().to_string_lossy())
}

fn is_normal(c: &Component) -> bool {
    matches!(c, Component::Normal(_))
}

fn to_windows_separators(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(target_os = "windows") {
        s.into_owned()
    } else {
        s.replace('/', "\\")
    }
}

#[cfg(test)]
#[cfg(not(target_os = "windows"))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/base", "x", "/base/x")]
    #[case("/base", r"x\y", "/base/x/y")]
    #[case("/base", "x/y", "/base/x/y")]
    #[case("/base/sub", r"..\x\y.csproj", "/base/x/y.csproj")]
    #[case("/base", r".\x", "/base/x")]
    #[trace]
    fn make_path_tests(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        // Arrange
        let d = Path::new(base);

        // Act
        let actual = make_path(d, path);

        // Assert
        assert_eq!(actual.to_str().unwrap(), expected);
    }

    #[rstest]
    #[case("/root", "/root/a/a.csproj", r"a\a.csproj")]
    #[case("/root/sln", "/root/a/a.csproj", r"..\a\a.csproj")]
    #[case("/root", "/root/a.csproj", "a.csproj")]
    #[case("/ROOT/Sln", "/root/sln/a.csproj", "a.csproj")]
    #[case("/", "/a/b.csproj", r"a\b.csproj")]
    #[case("rel", "/a/b.csproj", r"\a\b.csproj")]
    #[trace]
    fn relative_to_tests(#[case] base: &str, #[case] target: &str, #[case] expected: &str) {
        // Arrange

        // Act
        let actual = relative_to(Path::new(base), Path::new(target));

        // Assert
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case("/a/./b/../c", "/a/c")]
    #[case("/a/b/", "/a/b")]
    #[case("a/../../b", "../b")]
    #[trace]
    fn normalize_tests(#[case] raw: &str, #[case] expected: &str) {
        // Arrange

        // Act
        let actual = normalize(Path::new(raw));

        // Assert
        assert_eq!(actual, PathBuf::from(expected));
    }

    #[test]
    fn path_key_ignores_case_and_dots() {
        // Arrange
        let left = Path::new("/Root/./A/a.csproj");
        let right = Path::new("/root/a/B/../A.CSPROJ");

        // Act

        // Assert
        assert_eq!(path_key(left), path_key(right));
    }
}
