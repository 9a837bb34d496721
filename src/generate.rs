//! Project generation from an engine template

use crate::assets::remove_dir_if_exists;
use crate::config::DeployConfig;
use crate::project_config::{normalize, BuildConfig, LUNA2D_PATH_SYMBOL, PROJECT_META_DIR};
use crate::template::{self, ConstantMap, MaterializeOptions, MaterializeReport};
use crate::{tools, DeployError, Platform, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, instrument};

pub const PROJECT_NAME_CONSTANT: &str = "LUNA_PROJECT_NAME";
pub const LUNA2D_PATH_CONSTANT: &str = "LUNA2D_PATH";
const DEPLOY_TOOL_CONSTANT: &str = "LUNA_DEPLOY_TOOL";

pub const GITIGNORE_PATTERNS: [&str; 3] = ["assets/", "libs/", "*.pyc"];
pub const UPDATE_SCRIPT_FILE: &str = "update.py";

const UPDATE_SCRIPT_TEMPLATE: &str = r#"#----------------------------------------------------------
# Generated by the luna2d deploy tool. Do not edit.
# Refreshes this project from its game directory.
#----------------------------------------------------------

import os
import subprocess
import sys

project_path = os.path.realpath(os.path.join(os.path.dirname(os.path.abspath(__file__)), ".."))
sys.exit(subprocess.call(["LUNA_DEPLOY_TOOL", "sync", "--project_path", project_path]))
"#;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub game_path: PathBuf,
    pub project_path: PathBuf,
    pub template: String,
    pub name: String,
    pub platform: Platform,
    pub strip_git: bool,
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub template: MaterializeReport,
    pub build_config: BuildConfig,
}

/// Constants substituted into project templates
pub fn project_constants(name: &str) -> ConstantMap {
    ConstantMap::new()
        .with(PROJECT_NAME_CONSTANT, name)
        .with(LUNA2D_PATH_CONSTANT, LUNA2D_PATH_SYMBOL)
}

/// `<luna2d>/templates/<template>`
pub fn template_dir(luna2d_path: &Path, template: &str) -> PathBuf {
    luna2d_path.join("templates").join(template)
}

/// Materialize the template and write the `.luna2d` descriptor files.
/// Any existing project directory is replaced.
#[instrument(skip(config), fields(template = %request.template))]
pub fn generate_project(request: &GenerateRequest, config: &DeployConfig) -> Result<GenerateReport> {
    let luna2d_path = config.luna2d_path()?;
    let template_path = template_dir(&luna2d_path, &request.template);

    if !request.game_path.is_dir() {
        return Err(DeployError::NotFound(format!(
            "Game directory {}",
            request.game_path.display()
        )));
    }

    if !template_path.is_dir() {
        return Err(DeployError::NotFound(format!(
            "Template directory {}",
            template_path.display()
        )));
    }

    remove_dir_if_exists(&request.project_path)?;

    println!("Creating project from template...");
    let report = template::materialize(
        &template_path,
        &request.project_path,
        &project_constants(&request.name),
        MaterializeOptions {
            strip_git: request.strip_git,
        },
    )?;

    let build_config = BuildConfig {
        project_name: request.name.clone(),
        platform: request.platform,
        game_path: stored_game_path(&request.game_path, &request.project_path)?,
        luna2d_path: LUNA2D_PATH_SYMBOL.to_string(),
    };
    write_project_meta(&request.project_path, &build_config)?;

    info!(project = %request.name, path = %request.project_path.display(), "Project generated");
    Ok(GenerateReport {
        template: report,
        build_config,
    })
}

/// Write `build.luna2d`, `.gitignore` and the update entry point
pub fn write_project_meta(project_path: &Path, build_config: &BuildConfig) -> Result<()> {
    let meta_dir = project_path.join(PROJECT_META_DIR);
    fs::create_dir_all(&meta_dir)?;

    build_config.save(project_path)?;

    let mut gitignore = GITIGNORE_PATTERNS.join("\n");
    gitignore.push('\n');
    fs::write(meta_dir.join(".gitignore"), gitignore)?;

    let constants = ConstantMap::new().with(DEPLOY_TOOL_CONSTANT, crate::TOOL_NAME);
    fs::write(
        meta_dir.join(UPDATE_SCRIPT_FILE),
        constants.substitute(UPDATE_SCRIPT_TEMPLATE).into_owned(),
    )?;
    Ok(())
}

/// Re-run this tool's `update` command for a freshly generated project
pub fn run_initial_update(
    executable: &Path,
    request: &GenerateRequest,
    update_assets: bool,
    luna2d_path: &Path,
) -> Result<tools::ToolOutput> {
    let mut command = std::process::Command::new(executable);
    command
        .arg("update")
        .arg("--game_path")
        .arg(&request.game_path)
        .arg("--project_path")
        .arg(&request.project_path)
        .arg("--platform")
        .arg(request.platform.as_str())
        .arg("--skip_assets")
        .arg(if update_assets { "false" } else { "true" })
        .env(crate::project_config::LUNA2D_PATH_ENV, luna2d_path);
    tools::run_command(&mut command)
}

// Game path relative to the project when both are absolute, so the pair
// can be moved together
fn stored_game_path(game_path: &Path, project_path: &Path) -> Result<String> {
    let cwd = std::env::current_dir()?;
    let game = normalize(&cwd.join(game_path));
    let project = normalize(&cwd.join(project_path));

    let path = relative_path(&project, &game).unwrap_or(game);
    Ok(path.to_string_lossy().replace('\\', "/"))
}

/// Path leading from directory `base` to `target`; `None` when they share
/// no root (different drives)
pub fn relative_path(base: &Path, target: &Path) -> Option<PathBuf> {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();

    if base.first() != target.first() {
        return None;
    }

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base.len() {
        result.push("..");
    }
    for component in &target[common..] {
        result.push(component.as_os_str());
    }

    if result.as_os_str().is_empty() {
        result.push(".");
    }
    Some(result)
}
