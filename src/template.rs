//! Template materialization
//!
//! Copies a template directory tree into a destination, substituting
//! placeholder constants in every path segment and in the content of every
//! non-binary file.

use crate::{DeployError, Result};
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extensions of files that are copied verbatim instead of substituted
pub const BINARY_ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Placeholder token to replacement text table
///
/// Substitution is a single left-to-right pass: at each position the
/// longest matching key wins and replaced text is never scanned again, so
/// a value containing another key's text does not cascade.
#[derive(Debug, Clone, Default)]
pub struct ConstantMap {
    constants: BTreeMap<String, String>,
    text_pattern: Option<Regex>,
    bytes_pattern: Option<regex::bytes::Regex>,
}

impl ConstantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant. Empty keys are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        self.constants.insert(key, value.into());
        self.rebuild_patterns();
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.constants.keys().map(|k| k.as_str())
    }

    fn rebuild_patterns(&mut self) {
        let mut keys: Vec<&String> = self.constants.keys().collect();
        // Leftmost-first alternation: longer keys must come first
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        // Escaped literals always compile
        self.text_pattern = Regex::new(&alternation).ok();
        self.bytes_pattern = regex::bytes::Regex::new(&alternation).ok();
    }

    /// Replace every constant occurring in `text`
    pub fn substitute<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match &self.text_pattern {
            Some(pattern) if !self.constants.is_empty() => {
                pattern.replace_all(text, |caps: &regex::Captures| {
                    self.constants[&caps[0]].clone()
                })
            }
            _ => Cow::Borrowed(text),
        }
    }

    /// Byte-level variant of [`ConstantMap::substitute`] for file contents
    pub fn substitute_bytes<'a>(&self, data: &'a [u8]) -> Cow<'a, [u8]> {
        match &self.bytes_pattern {
            Some(pattern) if !self.constants.is_empty() => {
                pattern.replace_all(data, |caps: &regex::bytes::Captures| {
                    // Keys are UTF-8, so every match is too
                    let key = String::from_utf8_lossy(&caps[0]);
                    self.constants[&*key].clone().into_bytes()
                })
            }
            _ => Cow::Borrowed(data),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConstantMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ConstantMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterializeOptions {
    /// Skip version-control metadata (`.git*` entries)
    pub strip_git: bool,
}

/// Counts of what a materialization run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub directories_created: usize,
    pub files_substituted: usize,
    pub files_copied: usize,
    pub entries_skipped: usize,
}

pub fn is_binary_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            BINARY_ASSET_EXTENSIONS
                .iter()
                .any(|binary| ext.eq_ignore_ascii_case(binary))
        })
        .unwrap_or(false)
}

pub fn is_git_file(name: &str) -> bool {
    name.starts_with(".git")
}

/// Instantiate the template at `source` into `destination`
///
/// Errors are returned as soon as they happen; whatever was written up to
/// that point stays on disk.
pub fn materialize(
    source: &Path,
    destination: &Path,
    constants: &ConstantMap,
    options: MaterializeOptions,
) -> Result<MaterializeReport> {
    if !source.is_dir() {
        return Err(DeployError::NotFound(format!(
            "Template directory {}",
            source.display()
        )));
    }

    info!(
        source = %source.display(),
        destination = %destination.display(),
        constants = constants.len(),
        "Materializing template"
    );

    let mut report = MaterializeReport::default();
    let mut git_skipped = 0;
    fs::create_dir_all(destination)?;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let skip = options.strip_git && is_git_file(&entry.file_name().to_string_lossy());
            if skip {
                debug!(path = %entry.path().display(), "Skipping git metadata");
                git_skipped += 1;
            }
            !skip
        });

    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| DeployError::Validation(e.to_string()))?;
        let target = destination.join(substitute_path(relative, constants)?);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            report.directories_created += 1;
            continue;
        }

        if !entry.file_type().is_file() {
            debug!(path = %entry.path().display(), "Skipping non-regular file");
            report.entries_skipped += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        if is_binary_asset(entry.path()) {
            fs::copy(entry.path(), &target)?;
            report.files_copied += 1;
        } else {
            let data = fs::read(entry.path())?;
            fs::write(&target, constants.substitute_bytes(&data))?;
            report.files_substituted += 1;
        }
    }

    report.entries_skipped += git_skipped;

    info!(
        substituted = report.files_substituted,
        copied = report.files_copied,
        skipped = report.entries_skipped,
        "Template materialized"
    );
    Ok(report)
}

fn substitute_path(relative: &Path, constants: &ConstantMap) -> Result<PathBuf> {
    let mut result = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| {
                    DeployError::Validation(format!(
                        "Non UTF-8 path segment in template: {}",
                        relative.display()
                    ))
                })?;
                result.push(&*constants.substitute(segment));
            }
            other => result.push(other.as_os_str()),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_substitute_replaces_every_key() {
        let constants = ConstantMap::new()
            .with("LUNA_PROJECT_NAME", "FlappyLuna")
            .with("LUNA2D_PATH", "$(LUNA2D_PATH)");

        let result = constants.substitute("namespace LUNA_PROJECT_NAME; path=LUNA2D_PATH/lib");
        assert_eq!(result, "namespace FlappyLuna; path=$(LUNA2D_PATH)/lib");
    }

    #[test]
    fn test_substitute_does_not_cascade() {
        let constants = ConstantMap::new()
            .with("{{A}}", "{{B}}")
            .with("{{B}}", "b");

        assert_eq!(constants.substitute("{{A}} {{B}}"), "{{B}} b");
    }

    #[test]
    fn test_substitute_prefers_longest_key() {
        let constants = ConstantMap::new()
            .with("LUNA_SDKMODULE", "short")
            .with("LUNA_SDKMODULE_NAME", "Ads");

        assert_eq!(constants.substitute("LUNA_SDKMODULE_NAME"), "Ads");
        assert_eq!(constants.substitute("LUNA_SDKMODULE_TYPE"), "short_TYPE");
    }

    #[test]
    fn test_empty_map_borrows_input() {
        let constants = ConstantMap::new();
        assert!(matches!(constants.substitute("unchanged"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let constants = ConstantMap::new().with("", "x");
        assert!(constants.is_empty());
        assert_eq!(constants.substitute("abc"), "abc");
    }

    #[test]
    fn test_substitute_bytes_keeps_invalid_utf8() {
        let constants = ConstantMap::new().with("NAME", "demo");
        let data = b"\xff\xfeNAME\x00";
        assert_eq!(&*constants.substitute_bytes(data), b"\xff\xfedemo\x00");
    }

    #[test]
    fn test_is_binary_asset() {
        assert!(is_binary_asset(Path::new("icon.png")));
        assert!(is_binary_asset(Path::new("photo.JPG")));
        assert!(is_binary_asset(Path::new("a/b/splash.jpeg")));
        assert!(!is_binary_asset(Path::new("App.xaml.cpp")));
        assert!(!is_binary_asset(Path::new("png")));
    }

    #[test]
    fn test_is_git_file() {
        assert!(is_git_file(".gitignore"));
        assert!(is_git_file(".git"));
        assert!(is_git_file(".gitattributes"));
        assert!(!is_git_file("git.txt"));
        assert!(!is_git_file("my.gitignore"));
    }

    #[test]
    fn test_materialize_two_file_template() {
        let template = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(template.path(), "{{NAME}}.txt", b"hello {{NAME}}");

        let constants = ConstantMap::new().with("{{NAME}}", "demo");
        let report = materialize(
            template.path(),
            output.path(),
            &constants,
            MaterializeOptions::default(),
        )
        .unwrap();

        let content = fs::read_to_string(output.path().join("demo.txt")).unwrap();
        assert_eq!(content, "hello demo");
        assert_eq!(report.files_substituted, 1);
    }

    #[test]
    fn test_materialize_substitutes_directory_names() {
        let template = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(template.path(), "LUNA_PROJECT_NAME/LUNA_PROJECT_NAME.sln", b"LUNA_PROJECT_NAME");
        fs::create_dir_all(template.path().join("LUNA_PROJECT_NAME/Assets")).unwrap();

        let constants = ConstantMap::new().with("LUNA_PROJECT_NAME", "Game");
        materialize(template.path(), output.path(), &constants, MaterializeOptions::default())
            .unwrap();

        assert_eq!(
            fs::read_to_string(output.path().join("Game/Game.sln")).unwrap(),
            "Game"
        );
        assert!(output.path().join("Game/Assets").is_dir());
    }

    #[test]
    fn test_materialize_copies_binary_assets_verbatim() {
        let template = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let png = b"\x89PNG\r\n\x1a\nNAME inside binary";
        write(template.path(), "Assets/Logo.png", png);

        let constants = ConstantMap::new().with("NAME", "demo");
        let report = materialize(template.path(), output.path(), &constants, MaterializeOptions::default())
            .unwrap();

        assert_eq!(fs::read(output.path().join("Assets/Logo.png")).unwrap(), png);
        assert_eq!(report.files_copied, 1);
    }

    #[test]
    fn test_materialize_strip_git() {
        let template = TempDir::new().unwrap();
        write(template.path(), ".gitignore", b"build/");
        write(template.path(), ".git/HEAD", b"ref: refs/heads/master");
        write(template.path(), "main.cpp", b"int main() {}");

        let stripped = TempDir::new().unwrap();
        materialize(
            template.path(),
            stripped.path(),
            &ConstantMap::new(),
            MaterializeOptions { strip_git: true },
        )
        .unwrap();
        assert!(!stripped.path().join(".gitignore").exists());
        assert!(!stripped.path().join(".git").exists());
        assert!(stripped.path().join("main.cpp").exists());

        let kept = TempDir::new().unwrap();
        materialize(
            template.path(),
            kept.path(),
            &ConstantMap::new(),
            MaterializeOptions { strip_git: false },
        )
        .unwrap();
        assert!(kept.path().join(".gitignore").exists());
        assert!(kept.path().join(".git/HEAD").exists());
    }

    #[test]
    fn test_materialize_missing_source() {
        let output = TempDir::new().unwrap();
        let result = materialize(
            &output.path().join("missing"),
            output.path(),
            &ConstantMap::new(),
            MaterializeOptions::default(),
        );
        assert!(matches!(result, Err(DeployError::NotFound(_))));
    }
}
