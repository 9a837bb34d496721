use anyhow::Result;
use clap::ArgMatches;
use luna2d_deploy::sdk_module::{self, SdkModuleRequest};
use luna2d_deploy::DeployConfig;

use crate::cli::utils;

pub fn handle_sdk_module(matches: &ArgMatches, config: &DeployConfig) -> Result<()> {
    let request = SdkModuleRequest {
        project_path: utils::path(matches, "project_path")?,
        module_type: utils::string(matches, "module_type")?,
        template: utils::string(matches, "template")?,
        name: utils::string(matches, "name")?,
        platform: utils::platform(matches)?,
        package_name: matches
            .get_one::<String>("package_name")
            .cloned()
            .unwrap_or_default(),
        strip_git: utils::flag(matches, "strip_git"),
        clear_existing: utils::flag(matches, "debug_clear_project"),
    };

    println!(
        "Creating {} SDK module '{}' ({})",
        request.platform, request.name, request.module_type
    );
    let report = sdk_module::generate_sdk_module(&request, config)?;

    println!(
        "Done: {} written to {}",
        utils::pluralize("file", report.files_substituted + report.files_copied),
        request.project_path.display()
    );
    Ok(())
}
