//! Windows Phone project patching

use crate::project_config::{Orientation, PROJECT_META_DIR};
use crate::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const MANIFEST_EXTENSION: &str = "appxmanifest";

const ORIENTATION_PORTRAIT: &str =
    r#"<m3:InitialRotationPreference><m3:Rotation Preference="portrait" /></m3:InitialRotationPreference>"#;
const ORIENTATION_LANDSCAPE: &str = r#"<m3:InitialRotationPreference><m3:Rotation Preference="landscape" /><m3:Rotation Preference="landscapeFlipped" /></m3:InitialRotationPreference>"#;

fn orientation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<m3:InitialRotationPreference>.*?</m3:InitialRotationPreference>")
            .expect("orientation pattern is valid")
    })
}

pub fn orientation_block(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Portrait => ORIENTATION_PORTRAIT,
        Orientation::Landscape => ORIENTATION_LANDSCAPE,
    }
}

/// Replace every rotation preference block in manifest text
pub fn patch_orientation(manifest: &str, orientation: Orientation) -> String {
    orientation_regex()
        .replace_all(manifest, regex::NoExpand(orientation_block(orientation)))
        .into_owned()
}

/// Patch one manifest file. Returns whether its content changed.
pub fn patch_manifest_file(path: &Path, orientation: Orientation) -> Result<bool> {
    let content = fs::read_to_string(path)?;
    let patched = patch_orientation(&content, orientation);
    if patched == content {
        return Ok(false);
    }
    fs::write(path, patched)?;
    Ok(true)
}

/// Patch every `*.appxmanifest` in a generated project, ignoring the
/// deploy tool's own `.luna2d` directory
pub fn patch_project(project_dir: &Path, orientation: Orientation) -> Result<Vec<PathBuf>> {
    let mut patched = Vec::new();

    let walker = WalkDir::new(project_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != PROJECT_META_DIR);

    for entry in walker {
        let entry = entry?;
        let is_manifest = entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(MANIFEST_EXTENSION);
        if !is_manifest {
            continue;
        }

        if patch_manifest_file(entry.path(), orientation)? {
            debug!(manifest = %entry.path().display(), "Patched orientation");
            patched.push(entry.into_path());
        }
    }

    info!(manifests = patched.len(), orientation = ?orientation, "Updated Windows Phone project");
    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<Package>
  <Applications>
    <m3:VisualElements DisplayName="Game">
      <m3:InitialRotationPreference>
        <m3:Rotation Preference="portrait" />
      </m3:InitialRotationPreference>
    </m3:VisualElements>
  </Applications>
</Package>"#;

    #[test]
    fn test_patch_orientation_landscape() {
        let patched = patch_orientation(MANIFEST, Orientation::Landscape);
        assert!(patched.contains(ORIENTATION_LANDSCAPE));
        assert!(!patched.contains("Preference=\"portrait\""));
        assert!(patched.starts_with("<Package>"));
    }

    #[test]
    fn test_patch_orientation_without_block_is_noop() {
        let text = "<Package></Package>";
        assert_eq!(patch_orientation(text, Orientation::Portrait), text);
    }

    #[test]
    fn test_patch_project_skips_meta_dir() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("Package.appxmanifest"), MANIFEST).unwrap();
        let meta = project.path().join(PROJECT_META_DIR).join("assets");
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join("Package.appxmanifest"), MANIFEST).unwrap();

        let patched = patch_project(project.path(), Orientation::Landscape).unwrap();

        assert_eq!(patched.len(), 1);
        assert_eq!(fs::read_to_string(meta.join("Package.appxmanifest")).unwrap(), MANIFEST);
        let content = fs::read_to_string(project.path().join("Package.appxmanifest")).unwrap();
        assert!(content.contains("landscapeFlipped"));

        // second run has nothing left to change
        assert!(patch_project(project.path(), Orientation::Landscape).unwrap().is_empty());
    }
}
