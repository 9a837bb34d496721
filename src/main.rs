use clap::{Arg, ArgAction, Command};
use dotenv::dotenv;
use luna2d_deploy::{logging, DeployConfig, Platform};
use std::path::PathBuf;
use std::process;

mod cli;

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let matches = build_cli().get_matches();

    if let Err(e) = run_command(matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn platform_arg() -> Arg {
    Arg::new("platform")
        .long("platform")
        .help("Target platform")
        .required(true)
        .value_parser(clap::builder::PossibleValuesParser::new(
            Platform::ALL.map(|p| p.as_str()),
        ))
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
}

/// Boolean option usable bare (`--strip_git`) or with a value (`--strip_git false`)
fn bool_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .num_args(0..=1)
        .require_equals(false)
        .default_value("false")
        .default_missing_value("true")
        .value_parser(clap::builder::BoolishValueParser::new())
}

fn build_cli() -> Command {
    Command::new(luna2d_deploy::TOOL_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("luna2d DeployTool - generates and updates platform projects for luna2d games")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Generate a platform project from an engine template")
                .arg(path_arg("game_path", "Game directory containing config.luna2d"))
                .arg(path_arg("project_path", "Directory of the generated project (replaced if present)"))
                .arg(
                    Arg::new("template")
                        .long("template")
                        .help("Template name under <luna2d>/templates")
                        .required(true)
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Project name")
                        .required(true)
                )
                .arg(platform_arg())
                .arg(bool_arg("strip_git", "Skip .git* files of the template"))
                .arg(bool_arg("update_assets", "Also copy assets and compile scripts after generating"))
        )
        .subcommand(
            Command::new("update")
                .about("Refresh libraries, assets and scripts of a generated project")
                .arg(path_arg("game_path", "Game directory containing config.luna2d"))
                .arg(path_arg("project_path", "Generated project directory"))
                .arg(platform_arg())
                .arg(bool_arg("skip_assets", "Only refresh libraries and project files"))
        )
        .subcommand(
            Command::new("sync")
                .about("Update a generated project using the paths stored in .luna2d/build.luna2d")
                .arg(
                    Arg::new("project_path")
                        .long("project_path")
                        .help("Generated project directory")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                )
        )
        .subcommand(
            Command::new("sdk-module")
                .about("Create an SDK module project from a template")
                .arg(path_arg("project_path", "Directory of the new module project"))
                .arg(
                    Arg::new("module_type")
                        .long("module_type")
                        .help("Module type, e.g. ads or analytics")
                        .required(true)
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .help("Template name under <luna2d>/templates")
                        .required(true)
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Module name")
                        .required(true)
                )
                .arg(platform_arg())
                .arg(
                    Arg::new("package_name")
                        .long("package_name")
                        .help("Package name for platforms that use one")
                        .default_value("")
                )
                .arg(bool_arg("strip_git", "Skip .git* files of the template"))
                .arg(bool_arg("debug_clear_project", "Replace an existing project directory"))
        )
        .subcommand(
            Command::new("build-engine")
                .about("Run the native build-system generator for the engine")
                .arg(platform_arg())
                .arg(
                    Arg::new("build_type")
                        .long("build_type")
                        .help("CMake build type")
                        .default_value("Release")
                )
        )
        .arg(
            Arg::new("luna2d_path")
                .long("luna2d_path")
                .help("Engine installation (defaults to $LUNA2D_PATH)")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .global(true)
                .action(ArgAction::SetTrue)
        )
}

fn run_command(matches: clap::ArgMatches) -> anyhow::Result<()> {
    let mut config = DeployConfig::load()?;
    if let Some(path) = matches.get_one::<PathBuf>("luna2d_path") {
        config.engine.luna2d_path = Some(path.clone());
    }

    logging::init(&config.logging, matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("generate", sub_matches)) => {
            cli::commands::generate::handle_generate(sub_matches, &config)?
        }
        Some(("update", sub_matches)) => {
            cli::commands::update::handle_update(sub_matches, &config)?
        }
        Some(("sync", sub_matches)) => {
            cli::commands::update::handle_sync(sub_matches, &config)?
        }
        Some(("sdk-module", sub_matches)) => {
            cli::commands::sdk_module::handle_sdk_module(sub_matches, &config)?
        }
        Some(("build-engine", sub_matches)) => {
            cli::commands::build_engine::handle_build_engine(sub_matches, &config)?
        }
        _ => {
            unreachable!("Command parsing should ensure we never reach this");
        }
    }

    Ok(())
}
