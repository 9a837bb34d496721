use luna2d_deploy::template::{self, MaterializeOptions};
use luna2d_deploy::ConstantMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn constants() -> ConstantMap {
    ConstantMap::new()
        .with("LUNA_PROJECT_NAME", "Puzzle")
        .with("LUNA2D_PATH", "$(LUNA2D_PATH)")
}

#[test]
fn test_android_style_template() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("template");
    let destination = temp_dir.path().join("project");

    write(&source, "app/src/main/AndroidManifest.xml", b"<manifest package=\"com.luna.LUNA_PROJECT_NAME\"/>");
    write(&source, "app/src/main/java/LUNA_PROJECT_NAME/MainActivity.java", b"class LUNA_PROJECT_NAME {}");
    write(&source, "app/src/main/res/drawable/icon.png", b"\x89PNG LUNA_PROJECT_NAME");
    write(&source, "local.properties", b"sdk.dir=LUNA2D_PATH/android");
    write(&source, ".gitattributes", b"* text=auto");
    write(&source, ".git/HEAD", b"ref: refs/heads/master");
    fs::create_dir_all(source.join("app/libs")).unwrap();

    let report = template::materialize(
        &source,
        &destination,
        &constants(),
        MaterializeOptions { strip_git: true },
    )
    .unwrap();

    assert_eq!(
        fs::read_to_string(destination.join("app/src/main/java/Puzzle/MainActivity.java")).unwrap(),
        "class Puzzle {}"
    );
    assert_eq!(
        fs::read_to_string(destination.join("local.properties")).unwrap(),
        "sdk.dir=$(LUNA2D_PATH)/android"
    );
    // Binary assets are copied verbatim
    assert_eq!(
        fs::read(destination.join("app/src/main/res/drawable/icon.png")).unwrap(),
        b"\x89PNG LUNA_PROJECT_NAME"
    );
    assert!(destination.join("app/libs").is_dir());
    assert!(!destination.join(".git").exists());
    assert!(!destination.join(".gitattributes").exists());

    assert_eq!(report.files_copied, 1);
    assert_eq!(report.files_substituted, 3);
    assert_eq!(report.entries_skipped, 2);
}

#[test]
fn test_git_files_kept_without_strip() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("template");
    let destination = temp_dir.path().join("project");
    write(&source, ".gitignore", b"build/\nLUNA_PROJECT_NAME.apk\n");

    template::materialize(&source, &destination, &constants(), MaterializeOptions::default()).unwrap();

    assert_eq!(
        fs::read_to_string(destination.join(".gitignore")).unwrap(),
        "build/\nPuzzle.apk\n"
    );
}

#[test]
fn test_missing_template_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = template::materialize(
        &temp_dir.path().join("absent"),
        &temp_dir.path().join("project"),
        &constants(),
        MaterializeOptions::default(),
    );

    assert!(matches!(result, Err(luna2d_deploy::DeployError::NotFound(_))));
    assert!(!temp_dir.path().join("project").exists());
}

fn relative_files(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_output_mirrors_source_without_placeholders() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("template");
    let destination = temp_dir.path().join("project");
    let constants = ConstantMap::new()
        .with("LUNA_PROJECT_NAME", "Puzzle")
        .with("LUNA_PACKAGE_NAME", "com.example.puzzle")
        .with("LUNA2D_PATH", "/opt/luna2d");

    write(&source, "LUNA_PROJECT_NAME/LUNA_PROJECT_NAME.vcxproj", b"<Name>LUNA_PROJECT_NAME</Name>");
    write(&source, "LUNA_PROJECT_NAME/Assets/readme.txt", b"no placeholders here");
    write(&source, "src/LUNA_PACKAGE_NAME/Main.java", b"package LUNA_PACKAGE_NAME; // LUNA_PROJECT_NAME");
    write(&source, "CMakeLists.txt", b"include(LUNA2D_PATH/cmake)\nproject(LUNA_PROJECT_NAMELUNA_PROJECT_NAME)");
    fs::create_dir_all(source.join("LUNA_PROJECT_NAME/Generated")).unwrap();

    template::materialize(&source, &destination, &constants, MaterializeOptions::default()).unwrap();

    let expected: BTreeSet<String> = relative_files(&source)
        .iter()
        .map(|path| constants.substitute(path).into_owned())
        .collect();
    assert_eq!(relative_files(&destination), expected);

    for relative in relative_files(&destination) {
        let path = destination.join(&relative);
        for key in constants.keys() {
            assert!(!relative.contains(key), "{} still contains {}", relative, key);
        }
        if path.is_file() {
            let content = fs::read_to_string(&path).unwrap();
            for key in constants.keys() {
                assert!(!content.contains(key), "{} still contains {}", relative, key);
            }
        }
    }
}
