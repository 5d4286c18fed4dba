use clap::{ArgAction, ArgMatches, Command, command};
use clap_complete::{Shell, generate};
use solg::hierarchy::DEFAULT_SEPARATOR;
use solg::{Options, RandomIds};
use slngen::generate::Request;
use slngen::ux;
use std::path::PathBuf;
use std::{
    io,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use mimalloc::MiMalloc;

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[macro_use]
extern crate clap;

const PATH: &str = "PATH";
const DEFAULT_LOG_LEVEL: &str = "warn";
const VERBOSE_LOG_LEVEL: &str = "debug";

fn main() {
    let app = build_cli();
    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("generate", cmd)) => generate_solution(cmd),
        Some(("completion", cmd)) => print_completions(cmd),
        Some(("bugreport", cmd)) => print_bugreport(cmd),
        _ => {}
    }
}

fn generate_solution(cmd: &ArgMatches) {
    init_logging(cmd.get_flag("verbose"));

    let request = Request {
        inputs: cmd
            .get_many::<PathBuf>(PATH)
            .map(|v| v.cloned().collect())
            .unwrap_or_else(|| vec![PathBuf::from(".")]),
        solution_file: cmd.get_one::<PathBuf>("solution-file").cloned(),
        configurations: strings(cmd, "configuration"),
        platforms: strings(cmd, "platform"),
        items: cmd
            .get_many::<PathBuf>("solution-item")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        reuse_ids: !cmd.get_flag("new-ids"),
        options: Options {
            folders: cmd.get_flag("folders"),
            collapse_folders: cmd.get_flag("collapse-folders"),
            folder_separator: cmd
                .get_one::<String>("folder-separator")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SEPARATOR.to_owned()),
            visual_studio_version: cmd.get_one::<String>("vs-version").cloned(),
        },
    };
    let json = cmd.get_flag("json");

    let now = Instant::now();
    let generated = match slngen::generate::generate(&request, &mut RandomIds) {
        Ok(generated) => generated,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(code);
        }
    };

    for duplicate in generated.duplicates {
        eprintln!("{:?}", miette::Report::new(duplicate));
    }

    if json {
        match generated.summary.to_json(true) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                ux::print_warning(&e.to_string());
                std::process::exit(exitcode::SOFTWARE);
            }
        }
    } else {
        print!("{}", generated.summary);
        let duration = now.elapsed().as_millis();
        let duration = Duration::from_millis(u64::try_from(duration).unwrap_or(u64::MAX));
        println!();
        println!("{:>2} {}", "elapsed:", humantime::format_duration(duration));
    }
}

fn strings(cmd: &ArgMatches, id: &str) -> Vec<String> {
    cmd.get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let filter = if verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_completions(matches: &ArgMatches) {
    let mut cmd = build_cli();
    let bin_name = cmd.get_name().to_string();
    if let Some(generator) = matches.get_one::<Shell>("generator") {
        generate(*generator, &mut cmd, bin_name, &mut io::stdout());
    }
}

fn print_bugreport(_matches: &ArgMatches) {
    bugreport::bugreport!()
        .info(bugreport::collector::SoftwareVersion::default())
        .info(bugreport::collector::OperatingSystem::default())
        .info(bugreport::collector::CommandLine::default())
        .info(bugreport::collector::EnvironmentVariables::list(&["RUST_LOG"]))
        .print::<bugreport::format::Markdown>();
}

fn build_cli() -> Command {
    command!(crate_name!())
        .arg_required_else_help(true)
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .subcommand(
            Command::new("generate")
                .aliases(["g"])
                .about("Generates solution for project files and directories specified")
                .arg(
                    arg!([PATH])
                        .help("Project files or directories to search for them. The first project file is the primary one. Current directory if omitted")
                        .value_parser(value_parser!(PathBuf))
                        .num_args(0..)
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(-f --folders)
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Put projects into solution folders that mirror directory layout"),
                )
                .arg(
                    arg!(--"collapse-folders")
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Merge folders that contain a single child folder into one"),
                )
                .arg(
                    arg!(--"folder-separator" <SEPARATOR>)
                        .required(false)
                        .default_value(DEFAULT_SEPARATOR)
                        .help("Token between names of collapsed folders"),
                )
                .arg(
                    arg!(-c --configuration <CONFIGURATION>)
                        .required(false)
                        .action(ArgAction::Append)
                        .help("Solution configuration. Can be repeated or comma separated. Inferred from projects if omitted"),
                )
                .arg(
                    arg!(-p --platform <PLATFORM>)
                        .required(false)
                        .action(ArgAction::Append)
                        .help("Solution platform. Can be repeated or comma separated. Inferred from projects if omitted"),
                )
                .arg(
                    arg!(-o --"solution-file" <PATH>)
                        .required(false)
                        .value_parser(value_parser!(PathBuf))
                        .help("Solution path. Next to the primary project or inside the first directory if omitted"),
                )
                .arg(
                    arg!(-n --"new-ids")
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Don't reuse identifiers of the existing solution file"),
                )
                .arg(
                    arg!(--"solution-item" <PATH>)
                        .required(false)
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .help("File to add into Solution Items folder. Can be repeated"),
                )
                .arg(
                    arg!(--"vs-version" <VERSION>)
                        .required(false)
                        .help("Visual Studio version written into solution header, like 17.0.31903.59"),
                )
                .arg(
                    arg!(--json)
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Print summary as JSON"),
                )
                .arg(
                    arg!(-v --verbose)
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Log debug details like degraded configuration mappings"),
                ),
        )
        .subcommand(
            Command::new("completion")
                .about("Generate the autocompletion script for the specified shell")
                .arg(
                    arg!([generator])
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("bugreport")
                .about("Collect information about the system and the environment that users can send along with a bug report"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test_case(&["slngen", "g", "a.csproj", "dir"], 2 ; "files and directories")]
    #[test_case(&["slngen", "generate"], 0 ; "current directory")]
    fn generate_paths(args: &[&str], expected: usize) {
        // Arrange
        let cli = build_cli();

        // Act
        let matches = cli.try_get_matches_from(args).unwrap();

        // Assert
        let (_, cmd) = matches.subcommand().unwrap();
        let count = cmd.get_many::<PathBuf>(PATH).map_or(0, Iterator::count);
        assert_eq!(count, expected);
    }

    #[test]
    fn generate_repeated_values() {
        // Arrange
        let cli = build_cli();

        // Act
        let matches = cli
            .try_get_matches_from([
                "slngen", "generate", "-c", "Debug", "-c", "Release,Test", "-p", "x64", "-f",
                "--collapse-folders",
            ])
            .unwrap();

        // Assert
        let (_, cmd) = matches.subcommand().unwrap();
        assert_eq!(strings(cmd, "configuration"), vec!["Debug", "Release,Test"]);
        assert_eq!(strings(cmd, "platform"), vec!["x64"]);
        assert!(cmd.get_flag("folders"));
        assert!(cmd.get_flag("collapse-folders"));
        assert!(!cmd.get_flag("new-ids"));
    }
}
