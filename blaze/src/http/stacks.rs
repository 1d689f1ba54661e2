//! Portainer stack API

use async_trait::async_trait;

use crate::errors::CatalogError;
use crate::http::client::HttpClient;
use crate::models::stack::{Stack, StackFile, StackId, StackUpdate};
use crate::reconcile::catalog::{StackCatalog, StackUpdater};

impl HttpClient {
    /// List all stacks
    pub async fn get_stacks(&self) -> Result<Vec<Stack>, CatalogError> {
        let stacks: Option<Vec<Stack>> = self.get("/api/stacks").await?;
        match stacks {
            Some(stacks) if !stacks.is_empty() => Ok(stacks),
            _ => Err(CatalogError::NoStacksFound),
        }
    }

    /// Get the stack file content of a stack
    pub async fn get_stack_file(&self, stack_id: StackId) -> Result<String, CatalogError> {
        let path = format!("/api/stacks/{}/file", stack_id);
        let file: Option<StackFile> = self.get(&path).await?;
        file.and_then(|f| f.stack_file_content)
            .filter(|content| !content.is_empty())
            .ok_or(CatalogError::NoDocumentFound { stack_id })
    }

    /// Redeploy a stack with the given stack file
    pub async fn update_stack(
        &self,
        stack: &Stack,
        stack_file_content: &str,
    ) -> Result<(), CatalogError> {
        let path = format!("/api/stacks/{}?endpointId={}", stack.id, stack.endpoint_id);
        self.put(&path, &StackUpdate::redeploy(stack, stack_file_content))
            .await
    }
}

#[async_trait]
impl StackCatalog for HttpClient {
    async fn list_stacks(&self) -> Result<Vec<Stack>, CatalogError> {
        self.get_stacks().await
    }

    async fn fetch_document(&self, stack_id: StackId) -> Result<String, CatalogError> {
        self.get_stack_file(stack_id).await
    }
}

#[async_trait]
impl StackUpdater for HttpClient {
    async fn redeploy(&self, stack: &Stack, document: &str) -> Result<(), CatalogError> {
        self.update_stack(stack, document).await
    }
}
