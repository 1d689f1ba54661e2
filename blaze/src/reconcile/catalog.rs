//! Orchestration platform seams used by the pipeline

use async_trait::async_trait;

use crate::errors::CatalogError;
use crate::models::stack::{Stack, StackId};

/// Read access to the platform's stacks
#[async_trait]
pub trait StackCatalog: Send + Sync {
    /// List all stacks. An empty catalog is [`CatalogError::NoStacksFound`].
    async fn list_stacks(&self) -> Result<Vec<Stack>, CatalogError>;

    /// Fetch the raw stack file of a stack
    async fn fetch_document(&self, stack_id: StackId) -> Result<String, CatalogError>;
}

/// Redeploys stacks on the platform
#[async_trait]
pub trait StackUpdater: Send + Sync {
    /// Resubmit `document` unchanged with the stack's own env, pruning and re-pulling
    async fn redeploy(&self, stack: &Stack, document: &str) -> Result<(), CatalogError>;
}
