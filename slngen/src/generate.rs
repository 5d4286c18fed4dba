use std::path::{Path, PathBuf};

use itertools::Itertools;
use solg::{
    Duplicate, ExistingIds, IdSource, Names, Options, Solution, SolutionFile, category,
    discover, msbuild, paths,
};

use crate::error::{Collector, GenerateError};
use crate::summary::Summary;

const SOLUTION_EXTENSION: &str = "sln";

/// Everything the user asked for
#[derive(Debug, Default)]
pub struct Request {
    /// Project files and directories to search for them. First project file is the primary one.
    pub inputs: Vec<PathBuf>,
    pub solution_file: Option<PathBuf>,
    pub configurations: Vec<String>,
    pub platforms: Vec<String>,
    pub items: Vec<PathBuf>,
    /// Keep identifiers found in the solution being overwritten
    pub reuse_ids: bool,
    pub options: Options,
}

/// Generation result
#[derive(Debug)]
pub struct Generated {
    pub summary: Summary,
    pub duplicates: Vec<Duplicate>,
}

/// Evaluates projects, builds solution model and writes solution file.
///
/// Projects that cannot be evaluated are skipped. Projects with invalid
/// identifiers stop generation after all of them are found.
pub fn generate(request: &Request, ids: &mut dyn IdSource) -> Result<Generated, GenerateError> {
    let inputs = request.inputs.iter().map(|p| absolute(p)).collect::<Vec<_>>();
    let primary = inputs.iter().find(|p| is_project_file(p)).cloned();

    let mut unevaluated = Collector::new();
    let raws = project_files(&inputs)
        .into_iter()
        .filter_map(|path| match msbuild::evaluate(&path) {
            Ok(mut raw) => {
                raw.is_primary = primary.as_ref() == Some(&path);
                Some(raw)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "{e:?}");
                unevaluated.add_path(&path.to_string_lossy());
                None
            }
        })
        .collect::<Vec<_>>();
    if raws.is_empty() {
        return Err(GenerateError::NoProjects);
    }

    let solution_path = request
        .solution_file
        .as_deref()
        .map(absolute)
        .or_else(|| default_solution_path(primary.as_deref(), &inputs))
        .ok_or(GenerateError::NoProjects)?;

    let existing = request
        .reuse_ids
        .then(|| ExistingIds::read_file(&solution_path));

    let primary_raw = raws.iter().find(|r| r.is_primary);
    let declarations = primary_raw.map_or(&[][..], |r| r.custom_categories.as_slice());
    let (categories, mut errors) = solg::categories_from(declarations);

    let resolved = solg::resolve_projects(&raws, &categories, existing.as_ref(), ids);
    errors.extend(resolved.errors);
    if !errors.is_empty() {
        return Err(GenerateError::InvalidProjects { related: errors });
    }

    let mut solution = Solution::new(solution_path, existing, ids);
    for project in resolved.projects {
        solution.add_project(project);
    }
    if solution.projects.is_empty() {
        return Err(GenerateError::NoProjects);
    }
    solution.configurations = names(&request.configurations, Names::from_delimited);
    solution.platforms = names(&request.platforms, Names::platforms_from_delimited);
    let items = primary_raw
        .map(|r| r.solution_items.clone())
        .unwrap_or_default()
        .into_iter()
        .chain(request.items.iter().map(|p| absolute(p)));
    for item in items {
        solution.add_item(item);
    }

    let file = SolutionFile::new(&solution, &request.options, ids);
    file.write_file().map_err(|source| GenerateError::Write {
        path: solution.path.clone(),
        source,
    })?;
    tracing::debug!(path = %solution.path.display(), projects = solution.projects.len(), "solution written");

    let mut summary = Summary::new(&file, &solution);
    summary.excluded = resolved.excluded.len();
    summary.unevaluated = unevaluated;
    Ok(Generated {
        summary,
        duplicates: solution.duplicates(),
    })
}

/// Project files in argument order. Directories are expanded into files found within.
fn project_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    inputs
        .iter()
        .flat_map(|input| {
            if input.is_dir() {
                discover::project_files(input)
            } else if is_project_file(input) {
                vec![input.clone()]
            } else {
                tracing::warn!(path = %input.display(), "not a project file, skipped");
                vec![]
            }
        })
        .unique()
        .collect()
}

fn is_project_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| category::is_known_extension(&e.to_string_lossy()))
}

/// Next to primary project or inside the first directory passed
fn default_solution_path(primary: Option<&Path>, inputs: &[PathBuf]) -> Option<PathBuf> {
    if let Some(primary) = primary {
        return Some(primary.with_extension(SOLUTION_EXTENSION));
    }
    let dir = inputs.first()?;
    let name = dir.file_name()?.to_string_lossy();
    Some(dir.join(format!("{name}.{SOLUTION_EXTENSION}")))
}

/// Values may be given as many arguments or comma separated in a single one
fn names(values: &[String], parse: fn(&str) -> Names) -> Names {
    parse(&values.iter().flat_map(|v| v.split(',')).join(";"))
}

fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    paths::normalize(&path)
}
