use std::fmt::{self, Display};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use crate::category::SOLUTION_FOLDER;
use crate::hierarchy::{DEFAULT_SEPARATOR, Hierarchy};
use crate::id::{Id, IdSource};
use crate::paths::relative_to;
use crate::reconcile::{self, Matrix};
use crate::solution::Solution;

const HEADER: &str = "Microsoft Visual Studio Solution File, Format Version 12.00";
const MINIMUM_VISUAL_STUDIO_VERSION: &str = "10.0.40219.1";
const SOLUTION_ITEMS: &str = "Solution Items";
const SOLUTION_ITEMS_ID: Id = Id::from_u128(0xB283_EBC2_E01F_412D_9339_FD56_EF11_4549);
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Every solution line ends with CRLF regardless of platform
macro_rules! crlf {
    ($f:expr) => {
        $f.write_str("\r\n")
    };
    ($f:expr, $($arg:tt)*) => {
        write!($f, $($arg)*).and_then(|()| $f.write_str("\r\n"))
    };
}

/// Serialization knobs
#[derive(Debug, Clone)]
pub struct Options {
    /// Place projects into folders mirroring directory layout
    pub folders: bool,
    pub collapse_folders: bool,
    /// Token between names of collapsed folders
    pub folder_separator: String,
    /// Full Visual Studio version like `17.0.31903.59`, header lines are written only if set
    pub visual_studio_version: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            folders: false,
            collapse_folders: false,
            folder_separator: DEFAULT_SEPARATOR.to_owned(),
            visual_studio_version: None,
        }
    }
}

/// Solution ready to be written: projects ordered, folders built,
/// configurations reconciled.
pub struct SolutionFile<'a> {
    solution: &'a Solution,
    order: Vec<usize>,
    hierarchy: Option<Hierarchy>,
    matrix: Matrix,
    visual_studio_version: Option<String>,
}

impl<'a> SolutionFile<'a> {
    pub fn new(solution: &'a Solution, options: &Options, ids: &mut dyn IdSource) -> Self {
        let mut order = (0..solution.projects.len()).collect::<Vec<_>>();
        order.sort_by(|a, b| {
            solution.projects[*a]
                .full_path
                .cmp(&solution.projects[*b].full_path)
        });

        let hierarchy = if options.folders {
            let nested = order
                .iter()
                .map(|i| (*i, &solution.projects[*i]))
                .filter(|(_, p)| !p.is_primary)
                .map(|(i, p)| (i, p.full_path.as_path()));
            Hierarchy::build(nested, ids).map(|mut h| {
                if options.collapse_folders {
                    h.collapse(&options.folder_separator);
                }
                h
            })
        } else {
            None
        };

        let configurations =
            reconcile::solution_configurations(&solution.configurations, &solution.projects);
        let platforms = reconcile::solution_platforms(&solution.platforms, &solution.projects);
        let matrix = reconcile::reconcile(&configurations, &platforms, &solution.projects);

        Self {
            solution,
            order,
            hierarchy,
            matrix,
            visual_studio_version: options.visual_studio_version.clone(),
        }
    }

    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    #[must_use]
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    /// Writes solution into its path creating missing directories
    pub fn write_file(&self) -> io::Result<()> {
        if let Some(dir) = self
            .solution
            .path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
        {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(&self.solution.path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    /// Writes BOM and solution text
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(BOM)?;
        write!(writer, "{self}")
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crlf!(f)?;
        crlf!(f, "{HEADER}")?;
        if let Some(version) = &self.visual_studio_version {
            let major = version.split('.').next().unwrap_or(version);
            crlf!(f, "# Visual Studio Version {major}")?;
            crlf!(f, "VisualStudioVersion = {version}")?;
            crlf!(f, "MinimumVisualStudioVersion = {MINIMUM_VISUAL_STUDIO_VERSION}")?;
        }
        Ok(())
    }

    fn write_items(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.solution.items.is_empty() {
            return Ok(());
        }
        crlf!(
            f,
            "Project(\"{SOLUTION_FOLDER}\") = \"{SOLUTION_ITEMS}\", \"{SOLUTION_ITEMS}\", \"{SOLUTION_ITEMS_ID}\""
        )?;
        crlf!(f, "\tProjectSection(SolutionItems) = preProject")?;
        for item in &self.solution.items {
            let path = relative_to(self.solution.directory(), item);
            crlf!(f, "\t\t{path} = {path}")?;
        }
        crlf!(f, "\tEndProjectSection")?;
        crlf!(f, "EndProject")
    }

    fn write_projects(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for project in self.order.iter().map(|i| &self.solution.projects[*i]) {
            let path = relative_to(self.solution.directory(), &project.full_path);
            crlf!(
                f,
                "Project(\"{}\") = \"{}\", \"{path}\", \"{}\"",
                project.category,
                project.name,
                project.id
            )?;
            crlf!(f, "EndProject")?;
        }
        if let Some(hierarchy) = &self.hierarchy {
            for folder in hierarchy.folders() {
                crlf!(
                    f,
                    "Project(\"{SOLUTION_FOLDER}\") = \"{0}\", \"{0}\", \"{1}\"",
                    folder.name,
                    folder.id
                )?;
                crlf!(f, "EndProject")?;
            }
        }
        Ok(())
    }

    fn nested(&self) -> Vec<(Id, Id)> {
        let Some(hierarchy) = &self.hierarchy else {
            return Vec::new();
        };
        if self.solution.projects.len() <= 1 {
            return Vec::new();
        }
        let folders = hierarchy
            .folders()
            .filter_map(|f| hierarchy.parent_of_folder(f).map(|p| (f.id, p.id)));
        let projects = self.order.iter().filter_map(|i| {
            hierarchy
                .parent_of_project(*i)
                .map(|p| (self.solution.projects[*i].id, p.id))
        });
        folders.chain(projects).collect()
    }

    fn write_global(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crlf!(f, "Global")?;

        let nested = self.nested();
        if !nested.is_empty() {
            crlf!(f, "\tGlobalSection(NestedProjects) = preSolution")?;
            for (child, parent) in nested {
                crlf!(f, "\t\t{child} = {parent}")?;
            }
            crlf!(f, "\tEndGlobalSection")?;
        }

        crlf!(f, "\tGlobalSection(SolutionConfigurationPlatforms) = preSolution")?;
        for configuration in &self.matrix.configurations {
            for platform in &self.matrix.platforms {
                crlf!(f, "\t\t{configuration}|{platform} = {configuration}|{platform}")?;
            }
        }
        crlf!(f, "\tEndGlobalSection")?;

        crlf!(f, "\tGlobalSection(ProjectConfigurationPlatforms) = postSolution")?;
        for index in &self.order {
            let id = self.solution.projects[*index].id;
            for m in &self.matrix.projects[*index].mappings {
                let key = format!("{id}.{}|{}", m.solution_configuration, m.solution_platform);
                let value = format!("{}|{}", m.configuration, m.platform);
                crlf!(f, "\t\t{key}.ActiveCfg = {value}")?;
                if m.build {
                    crlf!(f, "\t\t{key}.Build.0 = {value}")?;
                }
                if m.deploy {
                    crlf!(f, "\t\t{key}.Deploy.0 = {value}")?;
                }
            }
        }
        crlf!(f, "\tEndGlobalSection")?;

        crlf!(f, "\tGlobalSection(SolutionProperties) = preSolution")?;
        crlf!(f, "\t\tHideSolutionNode = FALSE")?;
        crlf!(f, "\tEndGlobalSection")?;

        crlf!(f, "\tGlobalSection(ExtensibilityGlobals) = postSolution")?;
        crlf!(f, "\t\tSolutionGuid = {}", self.solution.id)?;
        crlf!(f, "\tEndGlobalSection")?;

        crlf!(f, "EndGlobal")
    }
}

impl Display for SolutionFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        self.write_items(f)?;
        self.write_projects(f)?;
        self.write_global(f)
    }
}
