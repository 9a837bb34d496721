use anyhow::Result;
use clap::ArgMatches;
use luna2d_deploy::update::{self, UpdateReport, UpdateRequest};
use luna2d_deploy::DeployConfig;
use std::path::PathBuf;

use crate::cli::utils;

pub fn handle_update(matches: &ArgMatches, config: &DeployConfig) -> Result<()> {
    let request = UpdateRequest {
        game_path: utils::path(matches, "game_path")?,
        project_path: utils::path(matches, "project_path")?,
        platform: utils::platform(matches)?,
        skip_assets: utils::flag(matches, "skip_assets"),
    };

    let report = update::run_update(&request, config)?;
    print_summary(&report, request.skip_assets);
    Ok(())
}

pub fn handle_sync(matches: &ArgMatches, config: &DeployConfig) -> Result<()> {
    let project_path = matches
        .get_one::<PathBuf>("project_path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let report = update::sync_project(&project_path, config)?;
    print_summary(&report, false);
    Ok(())
}

fn print_summary(report: &UpdateReport, skip_assets: bool) {
    println!("  Libraries: {}", utils::pluralize("file", report.engine_libs));
    if !report.sdk_modules.is_empty() {
        println!("  SDK modules: {}", report.sdk_modules.join(", "));
    }
    if report.patched_manifests > 0 {
        println!("  Manifests patched: {}", report.patched_manifests);
    }
    if skip_assets {
        return;
    }
    println!("  Assets: {}", utils::pluralize("file", report.assets_copied));
    println!(
        "  Removed {}",
        utils::pluralize("unused resolution variant", report.resolutions_removed)
    );
    println!("  Compiled {}", utils::pluralize("script", report.scripts_compiled));
}
