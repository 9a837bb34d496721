//! Project update pipeline
//!
//! Refreshes a generated project from its game directory and the engine
//! installation: merged config, prebuilt libraries, SDK modules, platform
//! patches, then assets and compiled scripts.

use crate::assets::{self, copy_tree, remove_dir_if_exists};
use crate::compiler::{append_to_path, ScriptCompiler};
use crate::config::DeployConfig;
use crate::project_config::{
    self, BuildConfig, GameConfig, GAME_CONFIG_FILE, PROJECT_CONFIG_FILE, PROJECT_META_DIR,
};
use crate::{libs, wp, DeployError, Platform, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// One update run
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub game_path: PathBuf,
    pub project_path: PathBuf,
    pub platform: Platform,
    pub skip_assets: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub engine_libs: usize,
    pub sdk_modules: Vec<String>,
    pub patched_manifests: usize,
    pub assets_copied: usize,
    pub resolutions_removed: usize,
    pub scripts_compiled: usize,
}

/// Paths inside a generated project's `.luna2d` directory
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(project_path: &Path) -> Self {
        Self {
            root: project_path.to_path_buf(),
        }
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(PROJECT_META_DIR)
    }

    pub fn libs_dir(&self) -> PathBuf {
        self.meta_dir().join("libs")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.meta_dir().join("assets")
    }

    pub fn game_assets_dir(&self) -> PathBuf {
        self.assets_dir().join("game")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.game_assets_dir().join("scripts")
    }
}

/// Base game config with the project override applied
pub fn load_merged_config(game_path: &Path, project_path: &Path) -> Result<Value> {
    let base = project_config::load(&game_path.join(GAME_CONFIG_FILE))?;
    let overrides = project_config::load_or_empty(&project_path.join(PROJECT_CONFIG_FILE))?;
    project_config::merge(&base, &overrides)
}

#[instrument(skip(config), fields(platform = %request.platform))]
pub fn run_update(request: &UpdateRequest, config: &DeployConfig) -> Result<UpdateReport> {
    let luna2d_path = config.luna2d_path()?;
    let layout = ProjectLayout::new(&request.project_path);
    let mut report = UpdateReport::default();

    let build_config = BuildConfig::load(&request.project_path)?;
    if build_config.platform != request.platform {
        warn!(
            stored = %build_config.platform,
            requested = %request.platform,
            "Requested platform differs from the generated project"
        );
    }

    println!("Updating config...");
    let merged = load_merged_config(&request.game_path, &request.project_path)?;
    let game_config = GameConfig::new(&merged);

    println!("Updating libraries...");
    report.engine_libs = libs::refresh_engine_libs(&luna2d_path, request.platform, &layout.libs_dir())?;
    let modules = libs::install_sdk_modules(
        &luna2d_path,
        request.platform,
        &game_config.sdk_modules(),
        &layout.libs_dir(),
    )?;
    report.sdk_modules = modules.installed_modules;

    println!("Updating project...");
    if request.platform == Platform::WindowsPhone {
        report.patched_manifests = wp::patch_project(&request.project_path, game_config.orientation())?.len();
    }

    if !request.skip_assets {
        update_assets(request, config, &luna2d_path, &layout, &merged, &mut report)?;
    }

    info!(project = %build_config.project_name, "Project updated");
    println!("Done");
    Ok(report)
}

/// Update a project using only what its `build.luna2d` records
pub fn sync_project(project_path: &Path, config: &DeployConfig) -> Result<UpdateReport> {
    let build_config = BuildConfig::load(project_path)?;
    let env_path = config
        .engine
        .luna2d_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());
    let luna2d_path = build_config.resolve_luna2d_path(project_path, env_path.as_deref())?;

    let mut config = config.clone();
    config.engine.luna2d_path = Some(luna2d_path);

    let request = UpdateRequest {
        game_path: build_config.resolve_game_path(project_path),
        project_path: project_path.to_path_buf(),
        platform: build_config.platform,
        skip_assets: false,
    };
    run_update(&request, &config)
}

fn update_assets(
    request: &UpdateRequest,
    config: &DeployConfig,
    luna2d_path: &Path,
    layout: &ProjectLayout,
    merged: &Value,
    report: &mut UpdateReport,
) -> Result<()> {
    if !request.game_path.is_dir() {
        return Err(DeployError::NotFound(format!(
            "Game directory {}",
            request.game_path.display()
        )));
    }

    println!("Updating assets...");
    remove_dir_if_exists(&layout.assets_dir())?;
    fs::create_dir_all(layout.assets_dir())?;
    report.assets_copied = copy_tree(&request.game_path, &layout.game_assets_dir())?;

    // Embedded config carries the project override
    project_config::save(merged, &layout.game_assets_dir().join(GAME_CONFIG_FILE))?;

    match GameConfig::new(merged).resolutions() {
        Some(resolutions) => {
            report.resolutions_removed =
                assets::strip_unused_resolutions(&layout.game_assets_dir(), &resolutions)?.len();
        }
        None => warn!("Game config declares no resolutions, keeping every variant"),
    }

    println!("Compiling scripts...");
    let compiler = script_compiler(config, luna2d_path, request.platform);
    report.scripts_compiled = compiler.compile_dir(&layout.scripts_dir())?;
    Ok(())
}

fn script_compiler(config: &DeployConfig, luna2d_path: &Path, platform: Platform) -> ScriptCompiler {
    let Some(path) = &config.compiler.path else {
        let compiler = ScriptCompiler::for_engine(luna2d_path, platform.is_64bit_capable());
        return match (&config.compiler.path64, platform.is_64bit_capable()) {
            (Some(path64), true) => ScriptCompiler::new(compiler.compiler()).with_64bit(path64),
            _ => compiler,
        };
    };

    let compiler = ScriptCompiler::new(path);
    if platform.is_64bit_capable() {
        let path64 = config
            .compiler
            .path64
            .clone()
            .unwrap_or_else(|| append_to_path(path, "64"));
        compiler.with_64bit(path64)
    } else {
        compiler
    }
}
