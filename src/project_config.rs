//! JSON configuration documents of a game and its generated projects
//!
//! * `config.luna2d` - base game configuration
//! * `project-config.luna2d` - optional per-project override
//! * `.luna2d/build.luna2d` - descriptor written when a project is generated

use crate::{DeployError, Platform, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub const GAME_CONFIG_FILE: &str = "config.luna2d";
pub const PROJECT_CONFIG_FILE: &str = "project-config.luna2d";
pub const PROJECT_META_DIR: &str = ".luna2d";
pub const BUILD_CONFIG_FILE: &str = "build.luna2d";
pub const SDK_MODULE_CONFIG_FILE: &str = "sdkmodule.luna2d";

/// Symbolic engine path resolved from the `LUNA2D_PATH` environment variable
pub const LUNA2D_PATH_SYMBOL: &str = "$(LUNA2D_PATH)";
pub const LUNA2D_PATH_ENV: &str = "LUNA2D_PATH";

/// Parse a JSON document
pub fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DeployError::NotFound(format!("Config file {}", path.display()))
        } else {
            DeployError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Like [`load`], but an absent file yields an empty object
pub fn load_or_empty(path: &Path) -> Result<Value> {
    if path.exists() {
        load(path)
    } else {
        Ok(Value::Object(Map::new()))
    }
}

/// Serialize to the on-disk format: sorted keys, four-space indent, `" : "`
/// between key and value, trailing newline
pub fn to_string(data: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, ConfigFormatter::new());
    data.serialize(&mut serializer)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| DeployError::Validation(e.to_string()))
}

pub fn save(data: &Value, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_string(data)?)?;
    Ok(())
}

/// Shallow merge: `base` with every top-level key of `override_config`
/// replaced. Neither input is modified.
pub fn merge(base: &Value, override_config: &Value) -> Result<Value> {
    let base = as_object(base, "base config")?;
    let overrides = as_object(override_config, "override config")?;

    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(merged))
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| DeployError::Validation(format!("{} must be a JSON object", what)))
}

struct ConfigFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> ConfigFormatter<'a> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for ConfigFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Typed view over the game config keys the deploy tool reads
#[derive(Debug, Clone)]
pub struct GameConfig<'a> {
    value: &'a Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl<'a> GameConfig<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn name(&self) -> Option<&'a str> {
        self.value.get("name").and_then(Value::as_str)
    }

    /// Declared resolution suffixes, `None` when the key is absent
    pub fn resolutions(&self) -> Option<Vec<String>> {
        self.string_list("resolutions")
    }

    pub fn sdk_modules(&self) -> Vec<String> {
        self.string_list("sdkmodules").unwrap_or_default()
    }

    /// Screen orientation, landscape unless the config says portrait
    pub fn orientation(&self) -> Orientation {
        match self.value.get("orientation").and_then(Value::as_str) {
            Some("portrait") => Orientation::Portrait,
            _ => Orientation::Landscape,
        }
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.value.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }
}

/// Descriptor of a generated project, stored in `.luna2d/build.luna2d`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub project_name: String,
    pub platform: Platform,
    pub game_path: String,
    #[serde(rename = "luna2dPath")]
    pub luna2d_path: String,
}

impl BuildConfig {
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_META_DIR).join(BUILD_CONFIG_FILE)
    }

    pub fn load(project_dir: &Path) -> Result<Self> {
        let value = load(&Self::path_in(project_dir))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn save(&self, project_dir: &Path) -> Result<()> {
        save(&serde_json::to_value(self)?, &Self::path_in(project_dir))
    }

    /// Game directory, absolute or relative to the project directory
    pub fn resolve_game_path(&self, project_dir: &Path) -> PathBuf {
        normalize(&project_dir.join(&self.game_path))
    }

    /// Engine installation directory
    ///
    /// `env_value` is the current value of `LUNA2D_PATH`; it is only
    /// consulted when the stored path is the symbolic one.
    pub fn resolve_luna2d_path(&self, project_dir: &Path, env_value: Option<&str>) -> Result<PathBuf> {
        if self.luna2d_path == LUNA2D_PATH_SYMBOL {
            return match env_value {
                Some(value) if !value.is_empty() => Ok(normalize(&absolute(Path::new(value))?)),
                _ => Err(DeployError::Configuration(format!(
                    "{} environment value isn't set",
                    LUNA2D_PATH_ENV
                ))),
            };
        }

        let stored = Path::new(&self.luna2d_path);
        if stored.is_absolute() {
            Ok(stored.to_path_buf())
        } else {
            Ok(normalize(&project_dir.join(stored)))
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Lexically resolve `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component.as_os_str());
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}
