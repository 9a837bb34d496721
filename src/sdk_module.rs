//! SDK module project scaffolding

use crate::assets::remove_dir_if_exists;
use crate::config::DeployConfig;
use crate::generate::{template_dir, LUNA2D_PATH_CONSTANT};
use crate::template::{self, ConstantMap, MaterializeOptions, MaterializeReport};
use crate::{DeployError, Platform, Result};
use std::path::PathBuf;
use tracing::info;

pub const MODULE_TYPE_CONSTANT: &str = "LUNA_SDKMODULE_TYPE";
pub const MODULE_NAME_CONSTANT: &str = "LUNA_SDKMODULE_NAME";
pub const PACKAGE_NAME_CONSTANT: &str = "LUNA_PACKAGE_NAME";

#[derive(Debug, Clone)]
pub struct SdkModuleRequest {
    pub project_path: PathBuf,
    pub module_type: String,
    pub template: String,
    pub name: String,
    pub platform: Platform,
    pub package_name: String,
    pub strip_git: bool,
    /// Replace an existing directory instead of refusing
    pub clear_existing: bool,
}

pub fn generate_sdk_module(request: &SdkModuleRequest, config: &DeployConfig) -> Result<MaterializeReport> {
    if request.clear_existing {
        remove_dir_if_exists(&request.project_path)?;
    } else if request.project_path.exists() {
        return Err(DeployError::AlreadyExists(
            request.project_path.display().to_string(),
        ));
    }

    let luna2d_path = config.luna2d_path()?;
    let constants = ConstantMap::new()
        .with(MODULE_TYPE_CONSTANT, request.module_type.as_str())
        .with(MODULE_NAME_CONSTANT, request.name.as_str())
        .with(PACKAGE_NAME_CONSTANT, request.package_name.as_str())
        .with(LUNA2D_PATH_CONSTANT, luna2d_path.to_string_lossy().replace('\\', "/"));

    let report = template::materialize(
        &template_dir(&luna2d_path, &request.template),
        &request.project_path,
        &constants,
        MaterializeOptions {
            strip_git: request.strip_git,
        },
    )?;

    info!(
        module = %request.name,
        platform = %request.platform,
        path = %request.project_path.display(),
        "SDK module project generated"
    );
    Ok(report)
}
