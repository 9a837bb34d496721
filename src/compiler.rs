//! Script bytecode compilation
//!
//! Scripts are compiled in place: after a successful run the `.lua` file
//! holds stripped bytecode instead of source text.

use crate::{tools, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const SCRIPT_EXTENSION: &str = "lua";

#[derive(Debug, Clone)]
pub struct ScriptCompiler {
    compiler: PathBuf,
    compiler64: Option<PathBuf>,
}

impl ScriptCompiler {
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
            compiler64: None,
        }
    }

    /// Also emit `<script>64` with the 64-bit compiler
    pub fn with_64bit(mut self, compiler64: impl Into<PathBuf>) -> Self {
        self.compiler64 = Some(compiler64.into());
        self
    }

    /// Compiler bundled with an engine installation (`tools/luac/luac`)
    pub fn for_engine(luna2d_path: &Path, use_64bit: bool) -> Self {
        let compiler = luna2d_path.join("tools").join("luac").join("luac");
        let compiler64 = append_to_path(&compiler, "64");
        let result = Self::new(compiler);
        if use_64bit {
            result.with_64bit(compiler64)
        } else {
            result
        }
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    pub fn compiler64(&self) -> Option<&Path> {
        self.compiler64.as_deref()
    }

    /// Compile one script, replacing its source with bytecode
    pub fn compile_in_place(&self, script: &Path) -> Result<()> {
        let compiled = append_to_path(script, "c");
        debug!(script = %script.display(), "Compiling script");

        tools::run(
            &self.compiler,
            [
                OsString::from("-s"),
                OsString::from("-o"),
                compiled.clone().into_os_string(),
                script.as_os_str().to_os_string(),
            ],
            None,
        )?;

        if let Some(compiler64) = &self.compiler64 {
            tools::run(
                compiler64,
                [
                    OsString::from("-s"),
                    OsString::from("-o"),
                    append_to_path(script, "64").into_os_string(),
                    script.as_os_str().to_os_string(),
                ],
                None,
            )?;
        }

        fs::remove_file(script)?;
        fs::rename(&compiled, script)?;
        Ok(())
    }

    /// Compile every script under `root`. Returns the number compiled.
    pub fn compile_dir(&self, root: &Path) -> Result<usize> {
        if !root.is_dir() {
            debug!(root = %root.display(), "No scripts directory");
            return Ok(0);
        }

        let mut scripts: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && is_script(entry.path()) {
                scripts.push(entry.into_path());
            }
        }

        for script in &scripts {
            self.compile_in_place(script)?;
        }

        info!(count = scripts.len(), "Compiled scripts");
        Ok(scripts.len())
    }
}

pub fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == SCRIPT_EXTENSION)
        .unwrap_or(false)
}

// `main.lua` + "c" -> `main.luac`
pub(crate) fn append_to_path(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_script() {
        assert!(is_script(Path::new("scripts/main.lua")));
        assert!(!is_script(Path::new("scripts/main.luac")));
        assert!(!is_script(Path::new("scripts/lua")));
    }

    #[test]
    fn test_for_engine_paths() {
        let compiler = ScriptCompiler::for_engine(Path::new("/opt/luna2d"), true);
        assert_eq!(compiler.compiler(), Path::new("/opt/luna2d/tools/luac/luac"));
        assert_eq!(compiler.compiler64(), Some(Path::new("/opt/luna2d/tools/luac/luac64")));

        let compiler = ScriptCompiler::for_engine(Path::new("/opt/luna2d"), false);
        assert_eq!(compiler.compiler64(), None);
    }

    #[test]
    fn test_append_to_path() {
        assert_eq!(append_to_path(Path::new("a/main.lua"), "c"), PathBuf::from("a/main.luac"));
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        // Fake compiler: writes "bytecode:<input>" to the -o target
        fn fake_compiler(dir: &Path, name: &str, exit_code: i32) -> PathBuf {
            let path = dir.join(name);
            let script = format!(
                "#!/bin/sh\nprintf 'bytecode:%s' \"$(cat \"$4\")\" > \"$3\"\nexit {}\n",
                exit_code
            );
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_compile_dir_replaces_sources() {
            let tools_dir = TempDir::new().unwrap();
            let game = TempDir::new().unwrap();
            let scripts = game.path().join("scripts");
            fs::create_dir_all(scripts.join("ui")).unwrap();
            fs::write(scripts.join("main.lua"), "print(1)").unwrap();
            fs::write(scripts.join("ui/menu.lua"), "print(2)").unwrap();
            fs::write(scripts.join("notes.txt"), "keep").unwrap();

            let compiler = ScriptCompiler::new(fake_compiler(tools_dir.path(), "luac", 0))
                .with_64bit(fake_compiler(tools_dir.path(), "luac64", 0));

            assert_eq!(compiler.compile_dir(&scripts).unwrap(), 2);
            assert_eq!(fs::read_to_string(scripts.join("main.lua")).unwrap(), "bytecode:print(1)");
            assert_eq!(fs::read_to_string(scripts.join("main.lua64")).unwrap(), "bytecode:print(1)");
            assert_eq!(fs::read_to_string(scripts.join("ui/menu.lua")).unwrap(), "bytecode:print(2)");
            assert!(!scripts.join("main.luac").exists());
            assert_eq!(fs::read_to_string(scripts.join("notes.txt")).unwrap(), "keep");
        }

        #[test]
        fn test_failing_compiler_stops_and_keeps_source() {
            let tools_dir = TempDir::new().unwrap();
            let game = TempDir::new().unwrap();
            fs::write(game.path().join("main.lua"), "print(").unwrap();

            let compiler = ScriptCompiler::new(fake_compiler(tools_dir.path(), "luac", 1));
            let result = compiler.compile_in_place(&game.path().join("main.lua"));

            assert!(matches!(result, Err(crate::DeployError::Tool { exit_code: Some(1), .. })));
            assert_eq!(fs::read_to_string(game.path().join("main.lua")).unwrap(), "print(");
        }

        #[test]
        fn test_unreadable_directory_fails_compile_dir() {
            let tools_dir = TempDir::new().unwrap();
            let game = TempDir::new().unwrap();
            let scripts = game.path().join("scripts");
            let locked = scripts.join("locked");
            fs::create_dir_all(&locked).unwrap();
            fs::write(scripts.join("main.lua"), "print(1)").unwrap();
            fs::write(locked.join("hidden.lua"), "print(2)").unwrap();
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

            // Privileged users read through the mode bits
            if fs::read_dir(&locked).is_ok() {
                fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
                return;
            }

            let compiler = ScriptCompiler::new(fake_compiler(tools_dir.path(), "luac", 0));
            let result = compiler.compile_dir(&scripts);
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

            assert!(matches!(result, Err(crate::DeployError::Walk(_))));
            assert_eq!(fs::read_to_string(scripts.join("main.lua")).unwrap(), "print(1)");
        }
    }
}
