/*!
A library for generating Microsoft Visual Studio solution files


## Example: writing solution for projects evaluated elsewhere

```
use solg::{Categories, Options, RawProject, SequentialIds, Solution, SolutionFile};

let mut ids = SequentialIds::new();
let mut raw = RawProject::new("/src/app/app.csproj");
raw.is_sdk_style = true;
raw.declared_configurations = Some("Debug;Release".to_owned());

let mut solution = Solution::new("/src/app.sln", None, &mut ids);
let resolved = solg::resolve_projects(&[raw], &Categories::new(), None, &mut ids);
assert!(resolved.errors.is_empty());
for project in resolved.projects {
    solution.add_project(project);
}

let file = SolutionFile::new(&solution, &Options::default(), &mut ids);
let text = file.to_string();
assert!(text.contains(r#"= "app", "app\app.csproj", "#));
assert!(text.contains("Release|Any CPU = Release|Any CPU"));
assert_eq!(file.matrix().stats.degraded, 0);
```
*/

#![warn(unused_extern_crates)]
#![allow(clippy::missing_errors_doc)]
use std::path::PathBuf;

pub mod category;
pub mod descriptor;
pub mod discover;
pub mod error;
pub mod hierarchy;
pub mod id;
pub mod msbuild;
pub mod names;
pub mod paths;
pub mod reader;
pub mod reconcile;
pub mod solution;
pub mod writer;

#[cfg(test)] // <-- not needed in integration tests
extern crate rstest;

pub use category::Categories;
pub use descriptor::{Exclusion, Project, RawProject, Resolution};
pub use error::SolgError;
pub use hierarchy::{Folder, Hierarchy};
pub use id::{Id, IdSource, RandomIds, SequentialIds};
pub use names::Names;
pub use reader::ExistingIds;
pub use reconcile::{MatchStats, Matrix};
pub use solution::{Duplicate, Solution};
pub use writer::{Options, SolutionFile};

/// Outcome of resolving a batch of evaluated projects
#[derive(Debug, Default)]
pub struct Resolved {
    pub projects: Vec<Project>,
    pub excluded: Vec<(PathBuf, Exclusion)>,
    /// Projects that cannot be used. Every one is kept so that all of them can be reported.
    pub errors: Vec<SolgError>,
}

/// Resolves every raw project. Failure of one project doesn't stop the others.
pub fn resolve_projects(
    raws: &[RawProject],
    categories: &Categories,
    existing: Option<&ExistingIds>,
    ids: &mut dyn IdSource,
) -> Resolved {
    let mut result = Resolved::default();
    for raw in raws {
        match descriptor::resolve(raw, categories, existing, ids) {
            Ok(Resolution::Included(project)) => result.projects.push(project),
            Ok(Resolution::Excluded(reason)) => {
                result.excluded.push((raw.full_path.clone(), reason));
            }
            Err(e) => result.errors.push(e),
        }
    }
    result
}

/// Builds project type table from custom declarations like `(".foo", "{GUID}")`.
/// Malformed declarations are returned and skipped.
pub fn categories_from(declarations: &[(String, String)]) -> (Categories, Vec<SolgError>) {
    let mut categories = Categories::new();
    let errors = declarations
        .iter()
        .filter_map(|(extension, id)| categories.add_raw_override(extension, id).err())
        .collect();
    (categories, errors)
}
