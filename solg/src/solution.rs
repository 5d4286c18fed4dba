use std::path::{Path, PathBuf};

use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::descriptor::Project;
use crate::id::{Id, IdSource};
use crate::names::Names;
use crate::paths::parent_of;
use crate::reader::ExistingIds;

/// Everything that goes into one solution file
#[derive(Debug, Clone)]
pub struct Solution {
    pub path: PathBuf,
    pub id: Id,
    pub projects: Vec<Project>,
    /// Configurations override. Empty means infer from projects.
    pub configurations: Names,
    /// Platforms override. Empty means infer from projects.
    pub platforms: Names,
    pub items: Vec<PathBuf>,
    existing: Option<ExistingIds>,
}

/// Projects sharing identifier or name. Solutions are still generated
/// with them but IDE behaviour is unpredictable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Duplicate {
    #[error("Identifier {id} is used by {} projects: {}", paths.len(), join(paths))]
    #[diagnostic(
        code(solg::duplicate_identifier),
        severity(Warning),
        help("Give each project its own ProjectGuid")
    )]
    Identifier { id: Id, paths: Vec<PathBuf> },

    #[error("Name '{name}' is used by {} projects: {}", paths.len(), join(paths))]
    #[diagnostic(code(solg::duplicate_name), severity(Warning))]
    Name { name: String, paths: Vec<PathBuf> },
}

fn join(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display()).join(", ")
}

impl Solution {
    /// Creates empty solution. Previously assigned solution id is reused when available.
    pub fn new<P: Into<PathBuf>>(
        path: P,
        existing: Option<ExistingIds>,
        ids: &mut dyn IdSource,
    ) -> Self {
        let id = existing
            .as_ref()
            .and_then(ExistingIds::solution_id)
            .unwrap_or_else(|| ids.next_id());
        Self {
            path: path.into(),
            id,
            projects: Vec::new(),
            configurations: Names::new(),
            platforms: Names::new(),
            items: Vec::new(),
            existing,
        }
    }

    /// Identifiers of the previous generation if reuse is on
    #[must_use]
    pub fn existing(&self) -> Option<&ExistingIds> {
        self.existing.as_ref()
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        parent_of(&self.path)
    }

    /// Adds project unless one with the same path is already there.
    /// Returns whether the project was added.
    pub fn add_project(&mut self, project: Project) -> bool {
        if self.projects.iter().any(|p| p.full_path == project.full_path) {
            tracing::debug!(path = %project.full_path.display(), "project already added");
            return false;
        }
        self.projects.push(project);
        true
    }

    pub fn add_item<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        if !self.items.contains(&path) {
            self.items.push(path);
        }
    }

    /// Projects that share an identifier or a display name (ignoring case)
    #[must_use]
    pub fn duplicates(&self) -> Vec<Duplicate> {
        let by_id = self
            .projects
            .iter()
            .into_group_map_by(|p| p.id)
            .into_iter()
            .filter(|(_, v)| v.len() > 1)
            .map(|(id, v)| Duplicate::Identifier {
                id,
                paths: v.iter().map(|p| p.full_path.clone()).sorted().collect(),
            })
            .sorted_by_key(|d| d.to_string());

        let by_name = self
            .projects
            .iter()
            .into_group_map_by(|p| p.name.to_lowercase())
            .into_values()
            .filter(|v| v.len() > 1)
            .map(|v| Duplicate::Name {
                name: v[0].name.clone(),
                paths: v.iter().map(|p| p.full_path.clone()).sorted().collect(),
            })
            .sorted_by_key(|d| d.to_string());

        by_id.chain(by_name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;
    use rstest::rstest;

    fn project(path: &str, name: &str, id: u128) -> Project {
        Project {
            full_path: PathBuf::from(path),
            name: name.to_owned(),
            id: Id::from_u128(id),
            category: Id::from_u128(0),
            configurations: Names::from_delimited("Debug"),
            platforms: Names::from_delimited("Any CPU"),
            is_primary: false,
            is_deployable: false,
        }
    }

    #[rstest]
    #[case(None, 1)]
    #[case(Some(42), 42)]
    #[trace]
    fn new_solution_id(#[case] previous: Option<u128>, #[case] expected: u128) {
        // Arrange
        let existing = previous.map(|id| {
            let mut e = ExistingIds::default();
            e.set_solution_id(Id::from_u128(id));
            e
        });
        let mut ids = SequentialIds::new();

        // Act
        let solution = Solution::new("/src/x.sln", existing, &mut ids);

        // Assert
        assert_eq!(solution.id, Id::from_u128(expected));
    }

    #[test]
    fn add_project_twice_ignored() {
        // Arrange
        let mut solution = Solution::new("/src/x.sln", None, &mut SequentialIds::new());

        // Act
        let first = solution.add_project(project("/src/a/a.csproj", "a", 1));
        let second = solution.add_project(project("/src/a/a.csproj", "a", 2));

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(solution.projects.len(), 1);
    }

    #[test]
    fn duplicates_found() {
        // Arrange
        let mut solution = Solution::new("/src/x.sln", None, &mut SequentialIds::new());
        solution.add_project(project("/src/a/a.csproj", "a", 1));
        solution.add_project(project("/src/b/b.csproj", "b", 1));
        solution.add_project(project("/src/c/A.csproj", "A", 3));

        // Act
        let duplicates = solution.duplicates();

        // Assert
        assert_eq!(
            duplicates,
            vec![
                Duplicate::Identifier {
                    id: Id::from_u128(1),
                    paths: vec![
                        PathBuf::from("/src/a/a.csproj"),
                        PathBuf::from("/src/b/b.csproj")
                    ],
                },
                Duplicate::Name {
                    name: "a".to_owned(),
                    paths: vec![
                        PathBuf::from("/src/a/a.csproj"),
                        PathBuf::from("/src/c/A.csproj")
                    ],
                },
            ]
        );
    }

    #[test]
    fn no_duplicates() {
        // Arrange
        let mut solution = Solution::new("/src/x.sln", None, &mut SequentialIds::new());
        solution.add_project(project("/src/a/a.csproj", "a", 1));
        solution.add_project(project("/src/b/b.csproj", "b", 2));

        // Act
        let duplicates = solution.duplicates();

        // Assert
        assert!(duplicates.is_empty());
    }

    #[test]
    fn duplicate_message() {
        // Arrange
        let duplicate = Duplicate::Name {
            name: "a".to_owned(),
            paths: vec![PathBuf::from("/x/a.csproj"), PathBuf::from("/y/a.csproj")],
        };

        // Act
        let message = duplicate.to_string();

        // Assert
        assert_eq!(
            message,
            "Name 'a' is used by 2 projects: /x/a.csproj, /y/a.csproj"
        );
    }
}
