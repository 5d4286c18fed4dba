use serde::Serialize;

pub const ANY_CPU: &str = "Any CPU";
const ANY_CPU_COMPACT: &str = "AnyCPU";

/// Rewrites MSBuild's `AnyCPU` spelling (any case) into the solution's `Any CPU`.
#[must_use]
pub fn normalize_platform(platform: &str) -> &str {
    if platform.eq_ignore_ascii_case(ANY_CPU_COMPACT) {
        ANY_CPU
    } else {
        platform
    }
}

/// Ordered set of configuration or platform names.
///
/// Names are compared ignoring ASCII case, the first spelling wins and
/// enumeration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Names(Vec<String>);

impl Names {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds name unless an equal one is present. Blank names are ignored.
    /// Returns whether the name was added.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_owned());
        true
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Returns stored spelling of the name specified
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|n| n.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorts names ignoring case, exact spelling breaks ties
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
    }

    /// Semicolon delimited list like MSBuild's `Configurations` property
    #[must_use]
    pub fn from_delimited(value: &str) -> Self {
        value.split(';').collect()
    }

    /// Same as [`Names::from_delimited`] but `AnyCPU` becomes `Any CPU`
    #[must_use]
    pub fn platforms_from_delimited(value: &str) -> Self {
        value.split(';').map(str::trim).map(normalize_platform).collect()
    }
}

impl<'a> FromIterator<&'a str> for Names {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut names = Names::new();
        names.extend(iter);
        names
    }
}

impl<'a> Extend<&'a str> for Names {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for name in iter {
            self.insert(name);
        }
    }
}

impl<'a> IntoIterator for &'a Names {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("AnyCPU", "Any CPU")]
    #[case("anycpu", "Any CPU")]
    #[case("ANYCPU", "Any CPU")]
    #[case("Any CPU", "Any CPU")]
    #[case("x64", "x64")]
    #[case("Win32", "Win32")]
    #[case("", "")]
    #[trace]
    fn normalize_platform_tests(#[case] raw: &str, #[case] expected: &str) {
        // Arrange

        // Act
        let actual = normalize_platform(raw);

        // Assert
        assert_eq!(actual, expected);
    }

    #[test]
    fn insert_ignores_case_and_keeps_first_spelling() {
        // Arrange
        let mut names = Names::new();

        // Act
        names.insert("Debug");
        names.insert("DEBUG");
        names.insert("Release");

        // Assert
        assert_eq!(names.len(), 2);
        assert_eq!(names.find("debug"), Some("Debug"));
        assert_eq!(names.first(), Some("Debug"));
    }

    #[rstest]
    #[case("Debug;Release", vec!["Debug", "Release"])]
    #[case(" Debug ; ; Release;", vec!["Debug", "Release"])]
    #[case("", vec![])]
    #[case("Release;release", vec!["Release"])]
    #[trace]
    fn from_delimited_tests(#[case] raw: &str, #[case] expected: Vec<&str>) {
        // Arrange

        // Act
        let actual = Names::from_delimited(raw);

        // Assert
        assert_eq!(actual.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn platforms_from_delimited_normalizes() {
        // Arrange
        let raw = "AnyCPU;x64;Any CPU";

        // Act
        let actual = Names::platforms_from_delimited(raw);

        // Assert
        assert_eq!(actual.iter().collect::<Vec<_>>(), vec!["Any CPU", "x64"]);
    }

    #[test]
    fn sort_ignores_case() {
        // Arrange
        let mut names: Names = ["release", "Debug", "Checked"].into_iter().collect();

        // Act
        names.sort();

        // Assert
        assert_eq!(
            names.iter().collect::<Vec<_>>(),
            vec!["Checked", "Debug", "release"]
        );
    }

    proptest! {
        #[test]
        fn any_cpu_in_any_case_normalizes(mask in proptest::collection::vec(any::<bool>(), 6)) {
            let raw: String = ANY_CPU_COMPACT
                .chars()
                .zip(mask)
                .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect();

            prop_assert_eq!(normalize_platform(&raw), ANY_CPU);
        }
    }
}
