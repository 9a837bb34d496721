use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Error, Debug)]
pub enum DeployError {
    // Standard library errors with automatic conversion
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot create project in \"{0}\". Directory already exists.")]
    AlreadyExists(String),

    // External tool exited with a non-zero status or could not be started
    #[error("{tool} failed with exit code {}: {output}", code_label(.exit_code))]
    Tool {
        tool: String,
        exit_code: Option<i32>,
        output: String,
    },
}

fn code_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
}

impl DeployError {
    pub fn tool(tool: impl Into<String>, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        DeployError::Tool {
            tool: tool.into(),
            exit_code,
            output: output.into(),
        }
    }
}

impl From<&str> for DeployError {
    fn from(msg: &str) -> Self {
        DeployError::Validation(msg.to_string())
    }
}

impl From<String> for DeployError {
    fn from(msg: String) -> Self {
        DeployError::Validation(msg)
    }
}
