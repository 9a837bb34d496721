//! Test helpers for creating hermetic engine/game/project layouts
//!
//! # Usage
//!
//! ```rust,ignore
//! use luna2d_deploy::test_helpers::TestWorkspace;
//!
//! let workspace = TestWorkspace::new()?;
//! workspace.add_engine_lib(Platform::Android, "armeabi-v7a/libluna2d.so")?;
//! workspace.add_game_file("scripts/main.lua", "print('hi')")?;
//!
//! // Now run the pipeline against workspace.engine() / workspace.game()
//! ```

use crate::project_config::{self, GAME_CONFIG_FILE, SDK_MODULE_CONFIG_FILE};
use crate::{DeployConfig, DeployError, Platform, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding an engine installation (`luna2d/`), a game
/// (`game/`) and room for generated projects
pub struct TestWorkspace {
    // Removed on drop
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    /// Create an empty workspace with `luna2d/` and `game/` directories
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()
            .map_err(|e| DeployError::Validation(format!("Failed to create temp directory: {}", e)))?;
        let root = temp_dir.path().to_path_buf();

        fs::create_dir_all(root.join("luna2d"))?;
        fs::create_dir_all(root.join("game"))?;

        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    /// Workspace with a game config and a minimal project template
    pub fn with_game(config: &Value) -> Result<Self> {
        let workspace = Self::new()?;
        workspace.write_game_config(config)?;
        workspace.add_engine_file(
            "templates/project-android/LUNA_PROJECT_NAME.txt",
            "project LUNA_PROJECT_NAME at LUNA2D_PATH",
        )?;
        Ok(workspace)
    }

    pub fn engine(&self) -> PathBuf {
        self.root.join("luna2d")
    }

    pub fn game(&self) -> PathBuf {
        self.root.join("game")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Deploy config pointing at this workspace's engine
    pub fn config(&self) -> DeployConfig {
        let mut config = DeployConfig::default();
        config.engine.luna2d_path = Some(self.engine());
        config
    }

    pub fn write_game_config(&self, config: &Value) -> Result<PathBuf> {
        let path = self.game().join(GAME_CONFIG_FILE);
        project_config::save(config, &path)?;
        Ok(path)
    }

    pub fn add_game_file(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.game().join(relative_path), content)
    }

    pub fn add_engine_file(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.engine().join(relative_path), content)
    }

    /// Prebuilt library under `lib/<platform>/release`
    pub fn add_engine_lib(&self, platform: Platform, relative_path: &str) -> Result<PathBuf> {
        let path = format!("lib/{}/release/{}", platform.as_str(), relative_path);
        self.add_engine_file(&path, relative_path)
    }

    /// SDK module with its `sdkmodule.luna2d` listing `files`
    pub fn add_sdk_module(&self, platform: Platform, name: &str, files: &[&str]) -> Result<PathBuf> {
        let module_dir = self
            .engine()
            .join("sdkmodules")
            .join(platform.as_str())
            .join(name);

        for file in files {
            write_file(&module_dir.join(file), file)?;
        }
        project_config::save(
            &serde_json::json!({ "files": files }),
            &module_dir.join(SDK_MODULE_CONFIG_FILE),
        )?;
        Ok(module_dir)
    }

    /// Install shell scripts standing in for `tools/luac/luac` and `luac64`.
    /// They write `bytecode:<source>` to the output file.
    #[cfg(unix)]
    pub fn install_fake_compiler(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let script = "#!/bin/sh\nprintf 'bytecode:%s' \"$(cat \"$4\")\" > \"$3\"\n";
        for name in ["luac", "luac64"] {
            let path = write_file(&self.engine().join("tools/luac").join(name), script)?;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}
