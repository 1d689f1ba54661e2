//! Opt-in service matching

use serde::{Deserialize, Serialize};

use crate::models::compose::{DeploymentDocument, Labels, ServiceDefinition};

/// Label prefix a service must carry to opt in to automatic redeploys
pub const DEFAULT_LABEL_PREFIX: &str = "blaze.update";

/// Where opt-in labels are looked up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelScope {
    /// Service-level `labels:` only
    Service,

    /// `deploy.labels:` only
    Deployment,

    /// Either location
    #[default]
    Both,
}

impl std::str::FromStr for LabelScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "service" => Ok(LabelScope::Service),
            "deployment" | "deploy" => Ok(LabelScope::Deployment),
            "both" => Ok(LabelScope::Both),
            _ => Err(format!("Invalid label scope: {}", s)),
        }
    }
}

/// Matching verdict for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchVerdict {
    /// Names of matching services, in document order
    pub services: Vec<String>,
}

impl MatchVerdict {
    /// Whether the stack should be redeployed
    pub fn is_match(&self) -> bool {
        !self.services.is_empty()
    }
}

/// Decides which services opted in and run the published image
#[derive(Debug, Clone)]
pub struct ServiceMatcher {
    label_prefix: String,
    scope: LabelScope,
}

impl Default for ServiceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_PREFIX, LabelScope::default())
    }
}

impl ServiceMatcher {
    pub fn new(label_prefix: impl Into<String>, scope: LabelScope) -> Self {
        Self {
            label_prefix: label_prefix.into(),
            scope,
        }
    }

    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    pub fn scope(&self) -> LabelScope {
        self.scope
    }

    /// Evaluate every service of a document against the published image
    pub fn evaluate(&self, document: &DeploymentDocument, artifact: &str) -> MatchVerdict {
        let services = document
            .services()
            .filter(|(_, service)| self.service_matches(service, artifact))
            .map(|(name, _)| name.to_string())
            .collect();
        MatchVerdict { services }
    }

    /// A service matches when its image is exactly the artifact and it opted in
    pub fn service_matches(&self, service: &ServiceDefinition, artifact: &str) -> bool {
        service.image.as_deref() == Some(artifact) && self.opted_in(service)
    }

    fn opted_in(&self, service: &ServiceDefinition) -> bool {
        let service_labels = service.labels.as_ref();
        let deploy_labels = service.deploy.as_ref().and_then(|d| d.labels.as_ref());

        match self.scope {
            LabelScope::Service => self.has_opt_in(service_labels),
            LabelScope::Deployment => self.has_opt_in(deploy_labels),
            LabelScope::Both => self.has_opt_in(service_labels) || self.has_opt_in(deploy_labels),
        }
    }

    fn has_opt_in(&self, labels: Option<&Labels>) -> bool {
        labels.is_some_and(|labels| {
            labels
                .entries()
                .any(|label| label.starts_with(self.label_prefix.as_str()))
        })
    }
}
