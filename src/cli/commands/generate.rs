use anyhow::{Context, Result};
use clap::ArgMatches;
use luna2d_deploy::generate::{self, GenerateRequest};
use luna2d_deploy::DeployConfig;
use std::time::Instant;

use crate::cli::utils;

pub fn handle_generate(matches: &ArgMatches, config: &DeployConfig) -> Result<()> {
    let request = GenerateRequest {
        game_path: utils::path(matches, "game_path")?,
        project_path: utils::path(matches, "project_path")?,
        template: utils::string(matches, "template")?,
        name: utils::string(matches, "name")?,
        platform: utils::platform(matches)?,
        strip_git: utils::flag(matches, "strip_git"),
    };
    let update_assets = utils::flag(matches, "update_assets");
    let start = Instant::now();

    println!("Generating {} project '{}'", request.platform, request.name);
    println!("Template: {}", request.template);

    let report = generate::generate_project(&request, config)?;
    println!(
        "Created {} directories and {} from template",
        report.template.directories_created,
        utils::pluralize("file", report.template.files_substituted + report.template.files_copied),
    );

    let executable = std::env::current_exe().context("Cannot locate the deploy tool executable")?;
    let output = generate::run_initial_update(&executable, &request, update_assets, &config.luna2d_path()?)?;
    print!("{}", output.combined());

    println!(
        "Project generated at {} in {}",
        request.project_path.display(),
        utils::format_duration(start.elapsed())
    );
    Ok(())
}
