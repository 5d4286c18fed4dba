use miette::{IntoDiagnostic, WrapErr};
use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;

use crate::descriptor::RawProject;
use crate::id::Id;
use crate::paths::{make_path, parent_of};

const CONFIGURATION_VARIABLE: &str = "$(Configuration)";
const PLATFORM_VARIABLE: &str = "$(Platform)";
const TRAVERSAL_SDK: &str = "Microsoft.Build.Traversal";
const SDK_CONFIGURATIONS: &str = "Debug;Release";
const SDK_PLATFORMS: &str = "AnyCPU";

/// Describes project type by id.
/// Returns human-readable description
/// or id itself if it's not match any
#[must_use]
pub fn describe_project(id: Id) -> String {
    let key = id.to_string();
    PROJECT_TYPES
        .get(key.as_str())
        .map_or(key, |d| (*d).to_owned())
}

/// Reads project file and extracts everything solution generation needs.
///
/// Evaluation is static: properties are taken as written, imports are not followed.
pub fn evaluate<P: AsRef<Path>>(path: P) -> miette::Result<RawProject> {
    let path = path.as_ref();
    let project = Project::from_path(path)
        .wrap_err_with(|| format!("Failed to evaluate {}", path.display()))?;
    Ok(project.to_raw(path))
}

/// `MSBuild` project structure
#[derive(Debug, Deserialize)]
pub struct Project {
    /// MSBuild SDK if applicable
    #[serde(rename = "Sdk", default)]
    pub sdk: Option<String>,

    #[serde(rename = "PropertyGroup", default)]
    pub property_group: Option<Vec<PropertyGroup>>,

    /// MSBuild project item groups
    #[serde(rename = "ItemGroup", default)]
    pub item_group: Option<Vec<ItemGroup>>,

    /// MSBuild project imports
    #[serde(rename = "Import")]
    pub imports: Option<Vec<Import>>,
}

/// Properties that matter for solution generation. Others are skipped.
#[derive(Debug, Default, Deserialize)]
pub struct PropertyGroup {
    #[serde(rename = "Condition", default)]
    pub condition: Option<String>,
    #[serde(rename = "ProjectGuid", default)]
    pub project_guid: Option<String>,
    #[serde(rename = "AssemblyName", default)]
    pub assembly_name: Option<String>,
    #[serde(rename = "SlnGenProjectName", default)]
    pub solution_name: Option<String>,
    #[serde(rename = "IncludeInSolutionFile", default)]
    pub include_in_solution: Option<String>,
    #[serde(rename = "IsTraversal", default)]
    pub is_traversal: Option<String>,
    #[serde(rename = "SlnGenIsDeployable", default)]
    pub is_deployable: Option<String>,
    #[serde(rename = "Configurations", default)]
    pub configurations: Option<String>,
    #[serde(rename = "Platforms", default)]
    pub platforms: Option<String>,
    #[serde(rename = "Configuration", default)]
    pub configuration: Option<Vec<Property>>,
    #[serde(rename = "Platform", default)]
    pub platform: Option<Vec<Property>>,
}

/// Property that may carry its own condition like
/// `<Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>`
#[derive(Debug, Deserialize)]
pub struct Property {
    #[serde(rename = "Condition", default)]
    pub condition: Option<String>,
    #[serde(rename = "$value", default)]
    pub value: Option<String>,
}

/// Represents a group of items within an `MSBuild` project.
#[derive(Debug, Deserialize)]
pub struct ItemGroup {
    #[serde(rename = "ProjectConfiguration", default)]
    pub project_configuration: Option<Vec<ProjectConfiguration>>,
    #[serde(rename = "SlnGenSolutionItem", default)]
    pub solution_item: Option<Vec<SolutionItem>>,
    #[serde(rename = "SlnGenCustomProjectTypeGuid", default)]
    pub custom_project_type: Option<Vec<CustomProjectType>>,
    #[serde(rename = "Condition", default)]
    pub condition: Option<String>,
}

/// C++ style configuration declaration, e.g. `Include="Debug|Win32"`
#[derive(Debug, Deserialize)]
pub struct ProjectConfiguration {
    #[serde(rename = "Include", default)]
    pub include: String,
    #[serde(rename = "Configuration", default)]
    pub configuration: Option<String>,
    #[serde(rename = "Platform", default)]
    pub platform: Option<String>,
}

/// File that is shown in the solution's `Solution Items` folder
#[derive(Debug, Deserialize)]
pub struct SolutionItem {
    #[serde(rename = "Include", default)]
    pub include: String,
}

/// Project type override for an extension
#[derive(Debug, Deserialize)]
pub struct CustomProjectType {
    /// File extension
    #[serde(rename = "Include", default)]
    pub include: String,
    #[serde(rename = "ProjectTypeGuid", default)]
    pub project_type_guid: Option<String>,
}

///
/// Represents an import in the MSBuild project.
///
/// Attributes:
///
/// * `project`: The path to the imported project.
/// * `sdk`: The SDK version used by the imported project (optional).
/// * `condition`: A condition that must be met for the import to take effect (optional).
/// * `label`: An optional label for the import.
#[derive(Debug, Deserialize)]
pub struct Import {
    #[serde(rename = "Project", default)]
    pub project: String,
    #[serde(rename = "Sdk", default)]
    pub sdk: Option<String>,
    #[serde(rename = "Condition", default)]
    pub condition: Option<String>,
    #[serde(rename = "Label", default)]
    pub label: Option<String>,
}

// subset of project type guids from https://github.com/JamesW75/visual-studio-project-type-guid
static PROJECT_TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "{CC5FD16D-436D-48AD-A40C-5A424C6E3E79}" => "Azure Project",
    "{30E03E5A-5F87-4398-9D0D-FEB397AFC92D}" => "Azure Functions",
    "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}" => "C#",
    "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}" => "C# (.Net Core)",
    "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}" => "C++",
    "{E53339B2-1760-4266-BCC7-CA923CBCF16C}" => "Docker Application",
    "{F2A71F9B-5D33-465A-A702-920D77279786}" => "F#",
    "{6EC3EE1D-3C4E-46DD-8F32-0CC8E7565705}" => "F# (.Net Core)",
    "{54A90642-561A-4BB1-A94E-469ADEE60C69}" => "JavaScript",
    "{9092AA53-FB77-4645-B42D-1CCCA6BD08BD}" => "Node.js",
    "{FF286327-C783-4F7A-AB73-9BCBAD0D4460}" => "NuGet Packaging",
    "{F5034706-568F-408A-B7B3-4D38C6DB8A32}" => "PowerShell",
    "{888888A0-9F3D-457C-B088-3A5042F75D52}" => "Python",
    "{A07B5EB6-E848-4116-A8D0-A826331D98C6}" => "Service Fabric Application",
    "{D954291E-2A0B-460D-934E-DC6B0785DB48}" => "Shared Project",
    "{2150E333-8FDC-42A3-9474-1A3956D46DE8}" => "Solution Folder",
    "{00D1A9C2-B5F0-4AF3-8072-F6C62B433612}" => "SQL Server Database",
    "{3AC096D0-A1C2-E12C-1390-A8335801FDAB}" => "Test",
    "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}" => "VB.NET",
    "{778DAE3C-4631-46EA-AA77-85C1314464D9}" => "VB.NET (.Net Core)",
    "{349C5851-65DF-11DA-9384-00065B846F21}" => "Web Application",
    "{E24C65DC-7377-472B-9ABA-BC803B73C61A}" => "Web Site",
    "{60DC8134-EBA5-43B8-BCC9-BB4BC16C2548}" => "Windows Presentation Foundation (WPF)",
    "{C7167F0D-BC9F-4E6E-AFE1-012C56B48DB5}" => "Windows Application Packaging Project (MSIX)",
    "{930C7802-8A8C-48F9-8165-68863BCCD9DD}" => "WiX (Windows Installer XML)",
};

impl Project {
    pub fn from_path<P: AsRef<Path>>(path: P) -> miette::Result<Project> {
        let file = File::open(path)
            .into_diagnostic()
            .wrap_err("Failed to read project file")?;
        Project::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> miette::Result<Project> {
        let mut de =
            serde_xml_rs::Deserializer::new_from_reader(reader).non_contiguous_seq_elements(true);
        let project: Project = Project::deserialize(&mut de)
            .into_diagnostic()
            .wrap_err("Failed to deserialize project file")?;
        Ok(project)
    }

    #[must_use]
    pub fn is_sdk_project(&self) -> bool {
        self.sdk.is_some()
            || self
                .imports
                .iter()
                .any(|i| i.iter().any(|elt| elt.sdk.is_some()))
    }

    /// Traversal SDK projects only build other projects
    #[must_use]
    pub fn is_traversal_project(&self) -> bool {
        let traversal = |sdk: Option<&str>| {
            sdk.is_some_and(|s| {
                s.to_ascii_lowercase()
                    .starts_with(&TRAVERSAL_SDK.to_ascii_lowercase())
            })
        };
        traversal(self.sdk.as_deref())
            || self
                .imports
                .iter()
                .flatten()
                .any(|i| traversal(i.sdk.as_deref()))
    }

    /// Converts project located at `path` into raw record
    #[must_use]
    pub fn to_raw(&self, path: &Path) -> RawProject {
        let mut raw = RawProject::new(path);
        raw.is_sdk_style = self.is_sdk_project();
        raw.is_traversal = self.is_traversal_project();

        let dir = parent_of(path);
        for group in self.item_group.iter().flatten() {
            for item in group.project_configuration.iter().flatten() {
                let (included_configuration, included_platform) = item
                    .include
                    .split_once('|')
                    .map_or((item.include.as_str(), ""), |(c, p)| (c, p));
                let configuration = item.configuration.as_deref().or(Some(included_configuration));
                let platform = item.platform.as_deref().or(Some(included_platform));
                add_possible(&mut raw.possible_configurations, configuration);
                add_possible(&mut raw.possible_platforms, platform);
            }
            for item in group.solution_item.iter().flatten() {
                if !item.include.trim().is_empty() {
                    raw.solution_items.push(make_path(dir, item.include.trim()));
                }
            }
            for item in group.custom_project_type.iter().flatten() {
                if let Some(guid) = item.project_type_guid.as_deref() {
                    raw.custom_categories
                        .push((item.include.trim().to_owned(), guid.trim().to_owned()));
                }
            }
        }

        for group in self.property_group.iter().flatten() {
            if let Some((configuration, platform)) =
                group.condition.as_deref().and_then(condition_values)
            {
                add_possible(&mut raw.possible_configurations, configuration);
                add_possible(&mut raw.possible_platforms, platform);
            }
            set_once(&mut raw.declared_id, group.project_guid.as_deref());
            set_once(&mut raw.display_name, group.assembly_name.as_deref());
            set_once(&mut raw.name_override, group.solution_name.as_deref());
            set_once(&mut raw.declared_configurations, group.configurations.as_deref());
            set_once(&mut raw.declared_platforms, group.platforms.as_deref());
            if raw.include_in_solution.is_none() {
                raw.include_in_solution = group.include_in_solution.as_deref().and_then(parse_bool);
            }
            if raw.is_deployable.is_none() {
                raw.is_deployable = group.is_deployable.as_deref().and_then(parse_bool);
            }
            if group.is_traversal.as_deref().and_then(parse_bool) == Some(true) {
                raw.is_traversal = true;
            }
            for property in group.configuration.iter().flatten() {
                add_possible(&mut raw.possible_configurations, property.value.as_deref());
            }
            for property in group.platform.iter().flatten() {
                add_possible(&mut raw.possible_platforms, property.value.as_deref());
            }
        }

        if raw.is_sdk_style {
            if raw.declared_configurations.is_none() && raw.possible_configurations.is_empty() {
                raw.declared_configurations = Some(SDK_CONFIGURATIONS.to_owned());
            }
            if raw.declared_platforms.is_none() && raw.possible_platforms.is_empty() {
                raw.declared_platforms = Some(SDK_PLATFORMS.to_owned());
            }
        }
        raw
    }
}

/// Extracts values from conditions like `'$(Configuration)|$(Platform)' == 'Debug|AnyCPU'`
fn condition_values(condition: &str) -> Option<(Option<&str>, Option<&str>)> {
    let (left, right) = condition.split_once("==")?;
    let left = left.trim().trim_matches('\'');
    let right = right.trim().trim_matches('\'');

    let mut configuration = None;
    let mut platform = None;
    for (variable, value) in left.split('|').zip(right.split('|')) {
        let variable = variable.trim();
        if variable.eq_ignore_ascii_case(CONFIGURATION_VARIABLE) {
            configuration = Some(value.trim());
        } else if variable.eq_ignore_ascii_case(PLATFORM_VARIABLE) {
            platform = Some(value.trim());
        }
    }
    if configuration.is_none() && platform.is_none() {
        None
    } else {
        Some((configuration, platform))
    }
}

/// Adds literal value. Empty values and values with unexpanded properties are skipped.
fn add_possible(values: &mut Vec<String>, value: Option<&str>) {
    let Some(value) = value.map(str::trim) else {
        return;
    };
    if value.is_empty() || value.contains("$(") {
        return;
    }
    if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        values.push(value.to_owned());
    }
}

fn set_once(target: &mut Option<String>, value: Option<&str>) {
    if target.is_none() {
        *target = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToOwned::to_owned);
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
