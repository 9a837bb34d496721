use crate::DeployError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target platform of a generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "wp")]
    WindowsPhone,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Android, Platform::Ios, Platform::WindowsPhone];

    /// Identifier used in directory names and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::WindowsPhone => "wp",
        }
    }

    /// Devices may run arm64, so scripts also get 64-bit bytecode
    pub fn is_64bit_capable(&self) -> bool {
        matches!(self, Platform::Ios)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "wp" => Ok(Platform::WindowsPhone),
            other => Err(DeployError::Validation(format!(
                "Unknown platform \"{}\" (expected android, ios or wp)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn test_only_ios_is_64bit_capable() {
        assert!(Platform::Ios.is_64bit_capable());
        assert!(!Platform::Android.is_64bit_capable());
        assert!(!Platform::WindowsPhone.is_64bit_capable());
    }
}
