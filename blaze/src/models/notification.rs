//! Package registry webhook models

use serde::Deserialize;

/// Action sent when a new package version is available
pub const PUBLISHED_ACTION: &str = "published";

/// Inbound `package` webhook body, only the fields Blaze reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub package: Option<PackagePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagePayload {
    #[serde(default)]
    pub package_version: Option<PackageVersionPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageVersionPayload {
    #[serde(default)]
    pub package_url: Option<String>,
}

impl WebhookPayload {
    /// The published image reference, if the payload carries one
    pub fn package_url(&self) -> Option<&str> {
        self.package
            .as_ref()?
            .package_version
            .as_ref()?
            .package_url
            .as_deref()
    }
}

/// A validated "package published" notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub action: String,

    /// Published image reference, matched exactly against service images
    pub artifact: String,
}
