//! Prebuilt engine libraries and SDK modules of a generated project

use crate::assets::{copy_tree, remove_dir_if_exists};
use crate::project_config::{self, SDK_MODULE_CONFIG_FILE};
use crate::{DeployError, Platform, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `sdkmodule.luna2d` of an SDK module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SdkModuleConfig {
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibsReport {
    pub installed_modules: Vec<String>,
    pub skipped_modules: Vec<String>,
}

/// `<luna2d>/lib/<platform>/release`
pub fn engine_libs_dir(luna2d_path: &Path, platform: Platform) -> PathBuf {
    luna2d_path.join("lib").join(platform.as_str()).join("release")
}

/// Replace `dest` with a fresh copy of the engine's release libraries
pub fn refresh_engine_libs(luna2d_path: &Path, platform: Platform, dest: &Path) -> Result<usize> {
    let source = engine_libs_dir(luna2d_path, platform);
    if !source.is_dir() {
        return Err(DeployError::NotFound(format!(
            "Engine libraries for {} at {}",
            platform,
            source.display()
        )));
    }

    remove_dir_if_exists(dest)?;
    copy_tree(&source, dest)
}

/// `<luna2d>/sdkmodules/<platform>/<name>`, if present
pub fn find_sdk_module(luna2d_path: &Path, platform: Platform, name: &str) -> Option<PathBuf> {
    let path = luna2d_path
        .join("sdkmodules")
        .join(platform.as_str())
        .join(name);
    path.is_dir().then_some(path)
}

/// Copy the files of each listed SDK module into `libs_dir` as
/// `<module>-<file>`. Missing modules or module configs are skipped with a
/// warning.
pub fn install_sdk_modules(
    luna2d_path: &Path,
    platform: Platform,
    modules: &[String],
    libs_dir: &Path,
) -> Result<LibsReport> {
    let mut report = LibsReport::default();
    fs::create_dir_all(libs_dir)?;

    for name in modules {
        let Some(module_path) = find_sdk_module(luna2d_path, platform, name) else {
            warn!(module = %name, "SDK module not found");
            println!("SDK module \"{}\" not found", name);
            report.skipped_modules.push(name.clone());
            continue;
        };

        let config_path = module_path.join(SDK_MODULE_CONFIG_FILE);
        if !config_path.exists() {
            warn!(module = %name, "SDK module config not found");
            println!("Config for SDK module \"{}\" not found", name);
            report.skipped_modules.push(name.clone());
            continue;
        }

        let module_config: SdkModuleConfig =
            serde_json::from_value(project_config::load(&config_path)?)?;

        for file in &module_config.files {
            let dest = libs_dir.join(format!("{}-{}", name, file));
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(module_path.join(file), &dest)?;
        }

        info!(module = %name, files = module_config.files.len(), "Installed SDK module");
        report.installed_modules.push(name.clone());
    }

    Ok(report)
}
