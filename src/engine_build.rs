//! Native engine build: runs the build-system generator for a platform

use crate::assets::{copy_tree, remove_dir_if_exists};
use crate::config::CmakeConfig;
use crate::{tools, Platform, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prebuilt OpenAL libraries, one subdirectory per ABI
pub const OPENAL_ANDROID_DIR: &str = "thirdparty/OpenAL/prebuilt/android";
/// `jniLibs` of the engine's gradle project
pub const GRADLE_JNI_LIBS_DIR: &str = "cmake/android/gradle-project/luna2d/src/main/jniLibs";

/// One generator (and optionally build) invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub build_dir: PathBuf,
    pub generate_args: Vec<String>,
    /// Run `cmake --build <dir>` after generating
    pub build: bool,
    /// Wipe the build directory first
    pub clean: bool,
}

/// Build directories and generator arguments for `platform`
pub fn plan(luna2d_path: &Path, platform: Platform, build_type: &str, cmake: &CmakeConfig) -> Vec<BuildStep> {
    let build_root = luna2d_path
        .join("build")
        .join(platform.as_str())
        .join(build_type.to_lowercase());
    let source = luna2d_path.to_string_lossy().to_string();
    let build_type_arg = format!("-DCMAKE_BUILD_TYPE={}", build_type);

    match platform {
        Platform::Android => {
            let toolchain = luna2d_path.join("cmake/android/android.toolchain.cmake");
            cmake
                .android_abis
                .iter()
                .map(|abi| BuildStep {
                    build_dir: build_root.join(abi),
                    generate_args: vec![
                        "-G".to_string(),
                        "Ninja".to_string(),
                        format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.to_string_lossy()),
                        format!("-DANDROID_NATIVE_API_LEVEL={}", cmake.android_api_level),
                        format!("-DANDROID_ABI={}", abi),
                        format!("-DANDROID_STL={}", cmake.android_stl),
                        build_type_arg.clone(),
                        source.clone(),
                    ],
                    build: true,
                    clean: false,
                })
                .collect()
        }
        Platform::Ios => {
            let toolchain = luna2d_path.join("cmake/ios/ios.toolchain.cmake");
            vec![BuildStep {
                build_dir: build_root,
                generate_args: vec![
                    "-G".to_string(),
                    "Xcode".to_string(),
                    format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.to_string_lossy()),
                    "-DIOS_PLATFORM=OS".to_string(),
                    build_type_arg,
                    source,
                ],
                build: false,
                clean: true,
            }]
        }
        Platform::WindowsPhone => vec![BuildStep {
            build_dir: build_root,
            generate_args: vec![
                "-G".to_string(),
                cmake.wp_generator.clone(),
                "-DCMAKE_SYSTEM_NAME=WindowsPhone".to_string(),
                format!("-DCMAKE_SYSTEM_VERSION={}", cmake.wp_system_version),
                build_type_arg,
                source,
            ],
            build: false,
            clean: true,
        }],
    }
}

/// Copy the prebuilt OpenAL libraries into the gradle project's `jniLibs`,
/// keeping the per-ABI layout. Returns the number of files copied.
pub fn copy_openal(luna2d_path: &Path) -> Result<usize> {
    let source = luna2d_path.join(OPENAL_ANDROID_DIR);
    if !source.is_dir() {
        warn!(path = %source.display(), "No prebuilt OpenAL libraries");
        return Ok(0);
    }

    let copied = copy_tree(&source, &luna2d_path.join(GRADLE_JNI_LIBS_DIR))?;
    info!(files = copied, "Copied OpenAL libraries");
    Ok(copied)
}

/// Execute the plan for `platform`. Stops at the first failing step.
pub fn build_engine(luna2d_path: &Path, platform: Platform, build_type: &str, cmake: &CmakeConfig) -> Result<usize> {
    let steps = plan(luna2d_path, platform, build_type, cmake);

    if platform == Platform::Android {
        copy_openal(luna2d_path)?;
    }

    for step in &steps {
        if step.clean {
            remove_dir_if_exists(&step.build_dir)?;
        }
        fs::create_dir_all(&step.build_dir)?;

        info!(dir = %step.build_dir.display(), "Generating build files");
        tools::run(&cmake.program, &step.generate_args, Some(&step.build_dir))?;

        if step.build {
            info!(dir = %step.build_dir.display(), "Building");
            tools::run(
                &cmake.program,
                ["--build".to_string(), step.build_dir.to_string_lossy().to_string()],
                None,
            )?;
        }
    }

    Ok(steps.len())
}
