//! In-memory Portainer fake and request helpers

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use blaze::errors::CatalogError;
use blaze::models::stack::{Stack, StackEnvVar, StackId};
use blaze::reconcile::catalog::{StackCatalog, StackUpdater};
use blaze::reconcile::coordinator::Coordinator;
use blaze::reconcile::counter::HookCounter;
use blaze::reconcile::matcher::ServiceMatcher;
use blaze::reconcile::signature::{sign, SignatureVerifier};

pub const SECRET: &str = "hook-secret";
pub const IMAGE: &str = "ghcr.io/acme/web:latest";

/// Platform call as observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListStacks,
    FetchDocument(StackId),
    Redeploy {
        stack_id: StackId,
        endpoint_id: u64,
        document: String,
        env: Option<Vec<StackEnvVar>>,
    },
}

#[derive(Default)]
pub struct FakePlatform {
    stacks: Vec<Stack>,
    files: HashMap<StackId, String>,
    fetch_delays: HashMap<StackId, Duration>,
    failing_updates: HashSet<StackId>,
    list_error: Option<CatalogError>,
    calls: Mutex<Vec<Call>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(mut self, id: StackId, name: &str, document: &str) -> Self {
        self.stacks.push(stack(id, name));
        self.files.insert(id, document.to_string());
        self
    }

    /// A stack whose file endpoint returns nothing
    pub fn with_empty_stack(mut self, id: StackId, name: &str) -> Self {
        self.stacks.push(stack(id, name));
        self
    }

    pub fn with_stack_env(mut self, id: StackId, env: Vec<StackEnvVar>) -> Self {
        if let Some(stack) = self.stacks.iter_mut().find(|s| s.id == id) {
            stack.env = Some(env);
        }
        self
    }

    pub fn with_fetch_delay(mut self, id: StackId, delay: Duration) -> Self {
        self.fetch_delays.insert(id, delay);
        self
    }

    pub fn failing_update(mut self, id: StackId) -> Self {
        self.failing_updates.insert(id);
        self
    }

    pub fn failing_list(mut self, err: CatalogError) -> Self {
        self.list_error = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn redeployed(&self) -> Vec<StackId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Redeploy { stack_id, .. } => Some(stack_id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StackCatalog for FakePlatform {
    async fn list_stacks(&self) -> Result<Vec<Stack>, CatalogError> {
        self.record(Call::ListStacks);
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        if self.stacks.is_empty() {
            return Err(CatalogError::NoStacksFound);
        }
        Ok(self.stacks.clone())
    }

    async fn fetch_document(&self, stack_id: StackId) -> Result<String, CatalogError> {
        self.record(Call::FetchDocument(stack_id));
        if let Some(delay) = self.fetch_delays.get(&stack_id) {
            tokio::time::sleep(*delay).await;
        }
        self.files
            .get(&stack_id)
            .cloned()
            .ok_or(CatalogError::NoDocumentFound { stack_id })
    }
}

#[async_trait]
impl StackUpdater for FakePlatform {
    async fn redeploy(&self, stack: &Stack, document: &str) -> Result<(), CatalogError> {
        self.record(Call::Redeploy {
            stack_id: stack.id,
            endpoint_id: stack.endpoint_id,
            document: document.to_string(),
            env: stack.env.clone(),
        });
        if self.failing_updates.contains(&stack.id) {
            return Err(CatalogError::UpstreamUnavailable(
                "500 Internal Server Error: stack update failed".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn stack(id: StackId, name: &str) -> Stack {
    Stack {
        id,
        name: name.to_string(),
        endpoint_id: 1,
        env: None,
    }
}

/// Compose file with one service
pub fn compose(image: &str, labels: &[&str]) -> String {
    let labels = labels
        .iter()
        .map(|l| format!("      - {l}\n"))
        .collect::<String>();
    let labels = if labels.is_empty() {
        String::new()
    } else {
        format!("    labels:\n{labels}")
    };
    format!("version: \"3.8\"\nservices:\n  app:\n    image: {image}\n{labels}")
}

pub fn coordinator(platform: &Arc<FakePlatform>) -> Coordinator {
    coordinator_with(platform, ServiceMatcher::default(), 4)
}

pub fn coordinator_with(
    platform: &Arc<FakePlatform>,
    matcher: ServiceMatcher,
    fetch_concurrency: usize,
) -> Coordinator {
    Coordinator::new(
        SignatureVerifier::new(Some(SecretString::from(SECRET.to_string()))),
        matcher,
        platform.clone(),
        platform.clone(),
        Arc::new(HookCounter::new()),
        fetch_concurrency,
    )
}

pub fn payload(action: &str, package_url: &str) -> Vec<u8> {
    serde_json::json!({
        "action": action,
        "package": {
            "name": "web",
            "package_type": "container",
            "package_version": {
                "version": "sha256:1f0c",
                "package_url": package_url,
            },
        },
    })
    .to_string()
    .into_bytes()
}

pub fn signature(body: &[u8]) -> String {
    sign(body, SECRET.as_bytes()).unwrap()
}
