//! Utility functions

use serde::{Deserialize, Serialize};

/// Project home, reported by the info endpoint
pub const REPOSITORY_URL: &str = "https://github.com/itmr-dev/blaze";

pub const LOGO_URL: &str = "https://raw.githubusercontent.com/itmr-dev/blaze/main/assets/blaze.png";

/// Version information for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}
