use serde::Serialize;

use crate::descriptor::Project;
use crate::names::{ANY_CPU, Names, normalize_platform};

/// Platforms a solution itself may advertise, in the order they are written
const SOLUTION_PLATFORMS: [&str; 3] = [ANY_CPU, "x64", "x86"];

/// Platforms tried in order when a project lacks the solution platform
fn fallback_chain(platform: &str) -> &'static [&'static str] {
    if platform.eq_ignore_ascii_case(ANY_CPU) {
        &["x64", "x86", "amd64", "Win32"]
    } else if platform.eq_ignore_ascii_case("x86") {
        &["Win32", ANY_CPU]
    } else if platform.eq_ignore_ascii_case("x64") {
        &["amd64", ANY_CPU]
    } else {
        &[]
    }
}

/// Configurations the solution advertises: override if any,
/// otherwise every project configuration sorted ignoring case.
#[must_use]
pub fn solution_configurations(overrides: &Names, projects: &[Project]) -> Names {
    if !overrides.is_empty() {
        return overrides.clone();
    }
    let mut names = projects
        .iter()
        .flat_map(|p| p.configurations.iter())
        .collect::<Names>();
    names.sort();
    names
}

/// Platforms the solution advertises: override if any, otherwise
/// project platforms limited to `Any CPU`, `x64` and `x86`.
#[must_use]
pub fn solution_platforms(overrides: &Names, projects: &[Project]) -> Names {
    if !overrides.is_empty() {
        return overrides.iter().map(normalize_platform).collect();
    }
    let all = projects
        .iter()
        .flat_map(|p| p.platforms.iter())
        .collect::<Names>();
    let mut names = SOLUTION_PLATFORMS
        .into_iter()
        .filter(|p| all.contains(p))
        .collect::<Names>();
    if names.is_empty() {
        names.insert(ANY_CPU);
    }
    names
}

/// Project configuration and platform selected for one solution pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub solution_configuration: String,
    pub solution_platform: String,
    pub configuration: String,
    pub platform: String,
    /// Project supports the solution pair so it's built
    pub build: bool,
    pub deploy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectMappings {
    /// Index of the project in the reconciled slice
    pub project: usize,
    pub mappings: Vec<Mapping>,
}

/// How well projects fit into solution pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Both configuration and platform matched literally
    pub exact: usize,
    /// Configuration missing, first project configuration used
    pub configuration_fallbacks: usize,
    /// Platform found through fallback chain
    pub platform_fallbacks: usize,
    /// Platform not found at all, first project platform used
    pub unmatched_platforms: usize,
    /// Mappings that are not exact
    pub degraded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matrix {
    pub configurations: Names,
    pub platforms: Names,
    pub projects: Vec<ProjectMappings>,
    pub stats: MatchStats,
}

enum PlatformMatch<'a> {
    Exact(&'a str),
    Fallback(&'a str),
    Unmatched(&'a str),
}

/// Maps every solution configuration and platform onto every project
#[must_use]
pub fn reconcile(configurations: &Names, platforms: &Names, projects: &[Project]) -> Matrix {
    let mut stats = MatchStats::default();
    let rows = projects
        .iter()
        .enumerate()
        .map(|(index, project)| ProjectMappings {
            project: index,
            mappings: map_project(project, configurations, platforms, &mut stats),
        })
        .collect();

    Matrix {
        configurations: configurations.clone(),
        platforms: platforms.clone(),
        projects: rows,
        stats,
    }
}

fn map_project(
    project: &Project,
    configurations: &Names,
    platforms: &Names,
    stats: &mut MatchStats,
) -> Vec<Mapping> {
    let mut result = Vec::with_capacity(configurations.len() * platforms.len());
    for solution_configuration in configurations {
        let matched_configuration = project.configurations.find(solution_configuration);
        let configuration = matched_configuration
            .or_else(|| project.configurations.first())
            .unwrap_or(solution_configuration);

        for solution_platform in platforms {
            let found = match_platform(solution_platform, &project.platforms);
            let (platform, platform_matched) = match found {
                PlatformMatch::Exact(p) => (p, true),
                PlatformMatch::Fallback(p) => {
                    stats.platform_fallbacks += 1;
                    (p, true)
                }
                PlatformMatch::Unmatched(p) => {
                    stats.unmatched_platforms += 1;
                    (p, false)
                }
            };

            let exact = matched_configuration.is_some()
                && project.platforms.contains(normalize_platform(solution_platform));
            if exact {
                stats.exact += 1;
            } else {
                stats.degraded += 1;
                tracing::debug!(
                    project = %project.name,
                    configuration = solution_configuration,
                    platform = solution_platform,
                    active_configuration = configuration,
                    active_platform = platform,
                    "degraded configuration mapping"
                );
            }
            if matched_configuration.is_none() {
                stats.configuration_fallbacks += 1;
            }

            result.push(Mapping {
                solution_configuration: solution_configuration.to_owned(),
                solution_platform: solution_platform.to_owned(),
                configuration: configuration.to_owned(),
                platform: platform.to_owned(),
                build: matched_configuration.is_some() && platform_matched,
                deploy: project.is_deployable,
            });
        }
    }
    result
}

fn match_platform<'a>(solution_platform: &str, project_platforms: &'a Names) -> PlatformMatch<'a> {
    let wanted = normalize_platform(solution_platform);
    if let Some(p) = project_platforms.find(wanted) {
        return PlatformMatch::Exact(p);
    }
    if let Some(p) = fallback_chain(wanted)
        .iter()
        .find_map(|candidate| project_platforms.find(candidate))
    {
        return PlatformMatch::Fallback(p);
    }
    PlatformMatch::Unmatched(project_platforms.first().unwrap_or(ANY_CPU))
}
