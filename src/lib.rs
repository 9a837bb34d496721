pub mod assets;
pub mod compiler;
pub mod config;
pub mod engine_build;
pub mod error;
pub mod generate;
pub mod libs;
pub mod logging;
pub mod platform;
pub mod project_config;
pub mod sdk_module;
pub mod template;
pub mod tools;
pub mod update;
pub mod wp;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::DeployConfig;
pub use error::{DeployError, Result};
pub use platform::Platform;
pub use template::{ConstantMap, MaterializeOptions};

/// Name of the command-line tool, as invoked by generated projects
pub const TOOL_NAME: &str = "luna2d-deploy";
