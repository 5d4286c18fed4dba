use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::category::{self, Categories};
use crate::error::SolgError;
use crate::id::{Id, IdSource};
use crate::names::{ANY_CPU, Names, normalize_platform};
use crate::reader::ExistingIds;

const DEFAULT_CONFIGURATION: &str = "Debug";

/// Evaluated project as produced by a project evaluator.
///
/// Nothing here is trusted or normalized yet, see [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct RawProject {
    pub full_path: PathBuf,
    /// Name the project calls itself, e.g. `AssemblyName`
    pub display_name: Option<String>,
    /// Explicit solution display name that beats everything else
    pub name_override: Option<String>,
    /// File extension used to select project type, e.g. `.csproj`
    pub extension: String,
    pub is_sdk_style: bool,
    /// Raw `ProjectGuid` value
    pub declared_id: Option<String>,
    /// Semicolon delimited `Configurations` property. SDK-style projects only.
    pub declared_configurations: Option<String>,
    /// Semicolon delimited `Platforms` property. SDK-style projects only.
    pub declared_platforms: Option<String>,
    pub possible_configurations: Vec<String>,
    pub possible_platforms: Vec<String>,
    pub is_deployable: Option<bool>,
    pub include_in_solution: Option<bool>,
    /// Project only aggregates (traverses) other projects
    pub is_traversal: bool,
    pub is_primary: bool,
    /// Extension to project type identifier declarations
    pub custom_categories: Vec<(String, String)>,
    pub solution_items: Vec<PathBuf>,
}

impl RawProject {
    /// Creates record with the extension taken from the path
    #[must_use]
    pub fn new<P: Into<PathBuf>>(full_path: P) -> Self {
        let full_path = full_path.into();
        let extension = full_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            full_path,
            extension,
            ..Default::default()
        }
    }
}

/// Project as it appears inside a solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub full_path: PathBuf,
    pub name: String,
    pub id: Id,
    pub category: Id,
    pub configurations: Names,
    pub platforms: Names,
    pub is_primary: bool,
    pub is_deployable: bool,
}

impl Project {
    /// Directory that contains project file
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.full_path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Why a project was left out of the solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// `IncludeInSolutionFile` set to false
    OptedOut,
    /// Traversal projects only build other projects
    Traversal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Included(Project),
    Excluded(Exclusion),
}

/// Turns raw evaluated record into a [`Project`].
///
/// # Errors
///
/// [`SolgError::InvalidIdentifier`] if the project declares malformed `ProjectGuid`.
/// Only this project is affected; the error carries a suggested replacement.
pub fn resolve(
    raw: &RawProject,
    categories: &Categories,
    existing: Option<&ExistingIds>,
    ids: &mut dyn IdSource,
) -> Result<Resolution, SolgError> {
    if raw.include_in_solution == Some(false) {
        tracing::debug!(path = %raw.full_path.display(), "project opted out of solution");
        return Ok(Resolution::Excluded(Exclusion::OptedOut));
    }
    if raw.is_traversal {
        tracing::debug!(path = %raw.full_path.display(), "traversal project skipped");
        return Ok(Resolution::Excluded(Exclusion::Traversal));
    }

    let id = resolve_id(raw, existing, ids)?;
    let project_type = categories.resolve(&raw.extension, raw.is_sdk_style);
    let is_deployable = raw
        .is_deployable
        .unwrap_or(project_type == category::SERVICE_FABRIC);

    Ok(Resolution::Included(Project {
        full_path: raw.full_path.clone(),
        name: resolve_name(raw),
        id,
        category: project_type,
        configurations: resolve_configurations(raw),
        platforms: resolve_platforms(raw),
        is_primary: raw.is_primary,
        is_deployable,
    }))
}

fn resolve_name(raw: &RawProject) -> String {
    [raw.name_override.as_deref(), raw.display_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| {
            raw.full_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

fn resolve_id(
    raw: &RawProject,
    existing: Option<&ExistingIds>,
    ids: &mut dyn IdSource,
) -> Result<Id, SolgError> {
    if let Some(id) = existing.and_then(|e| e.project(&raw.full_path)) {
        tracing::debug!(path = %raw.full_path.display(), %id, "reusing identifier");
        return Ok(id);
    }
    if raw.is_sdk_style {
        return Ok(ids.next_id());
    }
    match raw.declared_id.as_deref().map(str::trim) {
        None | Some("") => Ok(ids.next_id()),
        Some(value) => Id::parse(value).ok_or_else(|| SolgError::InvalidIdentifier {
            path: raw.full_path.clone(),
            value: value.to_owned(),
            suggested: ids.next_id(),
        }),
    }
}

fn resolve_configurations(raw: &RawProject) -> Names {
    let declared = raw
        .declared_configurations
        .as_deref()
        .filter(|_| raw.is_sdk_style)
        .map(Names::from_delimited)
        .filter(|n| !n.is_empty());

    let mut names = declared.unwrap_or_else(|| {
        raw.possible_configurations
            .iter()
            .map(String::as_str)
            .collect()
    });
    if names.is_empty() {
        names.insert(DEFAULT_CONFIGURATION);
    }
    names
}

fn resolve_platforms(raw: &RawProject) -> Names {
    let declared = raw
        .declared_platforms
        .as_deref()
        .filter(|_| raw.is_sdk_style)
        .map(Names::platforms_from_delimited)
        .filter(|n| !n.is_empty());

    let mut names = declared.unwrap_or_else(|| {
        raw.possible_platforms
            .iter()
            .map(|p| normalize_platform(p.trim()))
            .collect()
    });
    if names.is_empty() {
        names.insert(ANY_CPU);
    }
    names
}
