use std::fmt::Display;
use std::io;
use std::path::PathBuf;

use crossterm::style::Stylize;
use miette::Diagnostic;
use serde::Serialize;
use solg::SolgError;
use thiserror::Error;

use crate::ux;

/// Reasons generation stops without writing a solution
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("No projects found to put into solution")]
    #[diagnostic(
        code(slngen::no_projects),
        help("Pass project files or directories that contain them")
    )]
    NoProjects,

    #[error("{} project(s) cannot be added to solution", related.len())]
    #[diagnostic(code(slngen::invalid_projects))]
    InvalidProjects {
        #[related]
        related: Vec<SolgError>,
    },

    #[error("Failed to write solution {}", path.display())]
    #[diagnostic(code(slngen::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    #[must_use]
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            GenerateError::NoProjects => exitcode::NOINPUT,
            GenerateError::InvalidProjects { .. } => exitcode::DATAERR,
            GenerateError::Write { .. } => exitcode::IOERR,
        }
    }
}

/// Project files that couldn't be evaluated. They're skipped from the solution.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Collector {
    paths: Vec<String>,
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self { paths: vec![] }
    }

    pub fn add_path(&mut self, path: &str) {
        self.paths.push(path.to_owned());
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.paths.len() as u64
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.paths.is_empty() {
            writeln!(
                f,
                "{}",
                " These projects cannot be evaluated:".dark_red().bold()
            )?;

            let table = ux::one_column_table("Path", self.paths.iter().map(String::as_str));
            writeln!(f, "{table}")?;
        }
        Ok(())
    }
}
