use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use nom::bytes::complete::{is_not, tag, take_until};
use nom::character::complete::{char, space0};
use nom::combinator::{map, recognize};
use nom::error::ParseError;
use nom::sequence::{delimited, tuple};
use nom::IResult;

use crate::category;
use crate::id::Id;
use crate::paths::{make_path, parent_of, path_key};

const BOM: char = '\u{feff}';

/// Identifiers recovered from previously generated solution file.
///
/// Project lookups ignore path case so that reuse survives
/// case-only renames.
#[derive(Debug, Clone, Default)]
pub struct ExistingIds {
    solution_id: Option<Id>,
    projects: HashMap<String, (PathBuf, Id)>,
}

#[derive(Debug, PartialEq, Eq)]
struct ProjectLine<'a> {
    type_id: &'a str,
    name: &'a str,
    path: &'a str,
    id: &'a str,
}

impl ExistingIds {
    /// Reads solution file. Missing or unreadable file means nothing to reuse.
    /// Projects whose files no longer exist are forgotten.
    #[must_use]
    pub fn read_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let mut ids = Self::parse_str(&contents, parent_of(path));
                ids.retain_existing();
                tracing::debug!(
                    path = %path.display(),
                    projects = ids.len(),
                    "identifiers loaded from existing solution"
                );
                ids
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "existing solution cannot be read");
                Self::default()
            }
        }
    }

    /// Scans solution content. Project paths are resolved against `solution_dir`.
    /// Lines that cannot be understood are skipped.
    #[must_use]
    pub fn parse_str(contents: &str, solution_dir: &Path) -> Self {
        let contents = contents.strip_prefix(BOM).unwrap_or(contents);
        let mut result = Self::default();
        let mut in_extensibility = false;

        for line in contents.lines().map(str::trim) {
            if line.starts_with("GlobalSection(") {
                in_extensibility = line.starts_with("GlobalSection(ExtensibilityGlobals)");
                continue;
            }
            if line == "EndGlobalSection" {
                in_extensibility = false;
                continue;
            }
            if in_extensibility {
                if let Ok((_, id)) = solution_guid::<()>(line) {
                    result.solution_id = Id::parse(id).or(result.solution_id);
                }
                continue;
            }
            let Ok((_, project)) = project_line::<()>(line) else {
                continue;
            };
            let Some(type_id) = Id::parse(project.type_id) else {
                continue;
            };
            if type_id == category::SOLUTION_FOLDER {
                continue;
            }
            match Id::parse(project.id) {
                Some(id) => result.insert_project(make_path(solution_dir, project.path), id),
                None => tracing::debug!(name = project.name, "project line with invalid identifier skipped"),
            }
        }
        result
    }

    pub fn insert_project<P: Into<PathBuf>>(&mut self, path: P, id: Id) {
        let path = path.into();
        self.projects.insert(path_key(&path), (path, id));
    }

    /// Identifier previously assigned to the project file specified
    #[must_use]
    pub fn project(&self, path: &Path) -> Option<Id> {
        self.projects.get(&path_key(path)).map(|(_, id)| *id)
    }

    #[must_use]
    pub fn solution_id(&self) -> Option<Id> {
        self.solution_id
    }

    pub fn set_solution_id(&mut self, id: Id) {
        self.solution_id = Some(id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Drops entries whose project files are gone
    pub fn retain_existing(&mut self) {
        self.projects.retain(|_, (path, _)| path.exists());
    }
}

fn guid<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(delimited(char('{'), is_not("{}"), char('}')))(input)
}

fn quoted<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    delimited(char('"'), take_until("\""), char('"'))(input)
}

fn comma<'a, E>(input: &'a str) -> IResult<&'a str, (), E>
where
    E: ParseError<&'a str>,
{
    map(tuple((space0, char(','), space0)), |_| ())(input)
}

/// `Project("{type}") = "name", "path", "{id}"`
fn project_line<'a, E>(input: &'a str) -> IResult<&'a str, ProjectLine<'a>, E>
where
    E: ParseError<&'a str>,
{
    let parser = tuple((
        tag("Project(\""),
        guid,
        tag("\")"),
        space0,
        char('='),
        space0,
        quoted,
        comma,
        quoted,
        comma,
        delimited(char('"'), guid, char('"')),
    ));
    map(parser, |(_, type_id, _, _, _, _, name, (), path, (), id)| {
        ProjectLine {
            type_id,
            name,
            path,
            id,
        }
    })(input)
}

/// `SolutionGuid = {id}`
fn solution_guid<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    map(
        tuple((tag("SolutionGuid"), space0, char('='), space0, guid)),
        |(_, _, _, _, id)| id,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const SOLUTION: &str = "\u{feff}\r
Microsoft Visual Studio Solution File, Format Version 12.00\r
Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"app\", \"src\\app\\app.csproj\", \"{C8F6C172-56F2-4E76-B5FA-C3B423B31BE7}\"\r
EndProject\r
Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"src\", \"src\", \"{AAAAAAAA-56F2-4E76-B5FA-C3B423B31BE7}\"\r
EndProject\r
Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"broken\", \"src\\broken\\broken.csproj\", \"{zzz}\"\r
EndProject\r
this line is garbage\r
Global\r
\tGlobalSection(SolutionProperties) = preSolution\r
\t\tHideSolutionNode = FALSE\r
\tEndGlobalSection\r
\tGlobalSection(ExtensibilityGlobals) = postSolution\r
\t\tSolutionGuid = {0B1E5A53-D3E1-4A40-A1D1-0D53BFE1D5B2}\r
\tEndGlobalSection\r
EndGlobal\r
";

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn parse_str_collects_projects_and_solution_id() {
        // Arrange
        let dir = Path::new("/work");

        // Act
        let ids = ExistingIds::parse_str(SOLUTION, dir);

        // Assert
        assert_eq!(ids.len(), 1);
        assert_eq!(
            ids.project(Path::new("/work/src/app/app.csproj"))
                .map(|id| id.to_string()),
            Some("{C8F6C172-56F2-4E76-B5FA-C3B423B31BE7}".to_owned())
        );
        assert_eq!(
            ids.solution_id().map(|id| id.to_string()),
            Some("{0B1E5A53-D3E1-4A40-A1D1-0D53BFE1D5B2}".to_owned())
        );
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn project_lookup_ignores_case() {
        // Arrange
        let ids = ExistingIds::parse_str(SOLUTION, Path::new("/work"));

        // Act
        let actual = ids.project(Path::new("/WORK/Src/App/App.csproj"));

        // Assert
        assert!(actual.is_some());
    }

    #[test]
    fn solution_guid_outside_extensibility_ignored() {
        // Arrange
        let contents = "Global\n\tSolutionGuid = {0B1E5A53-D3E1-4A40-A1D1-0D53BFE1D5B2}\nEndGlobal\n";

        // Act
        let ids = ExistingIds::parse_str(contents, Path::new(""));

        // Assert
        assert!(ids.solution_id().is_none());
    }

    #[rstest]
    #[case("")]
    #[case("garbage")]
    #[case("Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"a\"")]
    #[trace]
    fn parse_str_tolerates_malformed(#[case] contents: &str) {
        // Arrange

        // Act
        let ids = ExistingIds::parse_str(contents, Path::new("/"));

        // Assert
        assert!(ids.is_empty());
        assert!(ids.solution_id().is_none());
    }

    #[rstest]
    #[case(
        r#"Project("{T}") = "n", "p\q.csproj", "{I}""#,
        ProjectLine { type_id: "{T}", name: "n", path: r"p\q.csproj", id: "{I}" }
    )]
    #[case(
        r#"Project("{T}")="", "p" , "{I}""#,
        ProjectLine { type_id: "{T}", name: "", path: "p", id: "{I}" }
    )]
    #[trace]
    fn project_line_tests(#[case] input: &str, #[case] expected: ProjectLine) {
        // Arrange

        // Act
        let result = project_line::<()>(input);

        // Assert
        assert_eq!(result, Ok(("", expected)));
    }

    #[test]
    fn read_file_missing_is_empty() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();

        // Act
        let ids = ExistingIds::read_file(&dir.path().join("absent.sln"));

        // Assert
        assert!(ids.is_empty());
        assert!(ids.solution_id().is_none());
    }

    #[test]
    fn read_file_forgets_deleted_projects() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let project_dir = dir.path().join("a");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("a.csproj"), "<Project />").unwrap();
        let contents = "\
Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"a\", \"a\\a.csproj\", \"{00000000-0000-0000-0000-000000000001}\"
EndProject
Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"b\", \"b\\b.csproj\", \"{00000000-0000-0000-0000-000000000002}\"
EndProject
";
        let sln = dir.path().join("x.sln");
        let mut file = fs::File::create(&sln).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        drop(file);

        // Act
        let ids = ExistingIds::read_file(&sln);

        // Assert
        assert_eq!(ids.len(), 1);
        assert_eq!(
            ids.project(&project_dir.join("a.csproj")),
            Some(Id::from_u128(1))
        );
    }
}
