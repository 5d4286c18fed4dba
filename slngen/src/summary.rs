use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::PathBuf;

use crossterm::style::Stylize;
use itertools::Itertools;
use serde::Serialize;
use solg::{Id, MatchStats, Names, SolutionFile, msbuild};

use crate::error::Collector;
use crate::ux;

/// What was generated
#[derive(Debug, Serialize)]
pub struct Summary {
    pub solution: PathBuf,
    pub id: Id,
    pub projects: Vec<ProjectSummary>,
    /// Project count per human readable project type
    pub project_types: BTreeMap<String, usize>,
    /// Projects opted out or skipped as traversal ones
    pub excluded: usize,
    pub folders: usize,
    pub configurations: Names,
    pub platforms: Names,
    pub stats: MatchStats,
    /// Reported as warnings while generating
    pub duplicates: Vec<String>,
    pub unevaluated: Collector,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub path: PathBuf,
    pub id: Id,
    pub project_type: String,
    pub primary: bool,
}

impl Summary {
    #[must_use]
    pub fn new(file: &SolutionFile, solution: &solg::Solution) -> Self {
        let projects = solution
            .projects
            .iter()
            .sorted_by(|a, b| a.full_path.cmp(&b.full_path))
            .map(|p| ProjectSummary {
                name: p.name.clone(),
                path: p.full_path.clone(),
                id: p.id,
                project_type: msbuild::describe_project(p.category),
                primary: p.is_primary,
            })
            .collect::<Vec<_>>();

        let mut project_types = BTreeMap::new();
        for p in &projects {
            *project_types.entry(p.project_type.clone()).or_insert(0) += 1;
        }

        let matrix = file.matrix();
        Self {
            solution: solution.path.clone(),
            id: solution.id,
            projects,
            project_types,
            excluded: 0,
            folders: file.hierarchy().map_or(0, |h| h.folders().count()),
            configurations: matrix.configurations.clone(),
            platforms: matrix.platforms.clone(),
            stats: matrix.stats,
            duplicates: solution.duplicates().iter().map(ToString::to_string).collect(),
            unevaluated: Collector::new(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " {}", self.solution.display().to_string().bold())?;
        writeln!(f)?;

        let mut table = ux::new_table();
        table.set_header(vec![ux::header("Project type"), ux::header("Count")]);
        for (key, value) in &self.project_types {
            table.add_row(vec![ux::highlighted_cell(key), ux::number_cell(*value)]);
        }
        writeln!(f, "{table}")?;
        writeln!(f)?;

        let mut table = ux::new_table();
        table.set_header(vec![ux::header("Configuration"), ux::header("Platform")]);
        for pair in self
            .configurations
            .iter()
            .zip_longest(self.platforms.iter())
        {
            let (configuration, platform) = pair.or("", "");
            table.add_row(vec![configuration, platform]);
        }
        writeln!(f, "{table}")?;
        writeln!(f)?;

        let mut table = ux::new_plain_table();
        let rows = [
            ("Projects", self.projects.len()),
            ("Excluded projects", self.excluded),
            ("Folders", self.folders),
            ("Exact mappings", self.stats.exact),
            ("Configuration fallbacks", self.stats.configuration_fallbacks),
            ("Platform fallbacks", self.stats.platform_fallbacks),
            ("Unmatched platforms", self.stats.unmatched_platforms),
        ];
        for (name, value) in rows {
            table.add_row(vec![comfy_table::Cell::new(name), ux::number_cell(value)]);
        }
        writeln!(f, "{table}")?;

        if self.unevaluated.count() > 0 {
            writeln!(f)?;
        }
        write!(f, "{}", self.unevaluated)
    }
}
