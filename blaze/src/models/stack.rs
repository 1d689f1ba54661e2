//! Portainer stack models

use serde::{Deserialize, Serialize};

/// Stack identifier as assigned by Portainer
pub type StackId = u64;

/// A stack as reported by `GET /api/stacks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stack {
    /// Unique stack ID
    pub id: StackId,

    /// Stack name
    pub name: String,

    /// Endpoint (environment) the stack is deployed to
    pub endpoint_id: u64,

    /// Stack environment variables, resubmitted unchanged on update
    #[serde(default)]
    pub env: Option<Vec<StackEnvVar>>,
}

/// A single stack environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEnvVar {
    pub name: String,
    pub value: String,
}

/// Response of `GET /api/stacks/{id}/file`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackFile {
    #[serde(rename = "StackFileContent", default)]
    pub stack_file_content: Option<String>,
}

/// Body of `PUT /api/stacks/{id}?endpointId={endpointId}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackUpdate<'a> {
    pub stack_file_content: &'a str,
    pub env: Option<&'a [StackEnvVar]>,
    pub prune: bool,
    pub pull_image: bool,
}

impl<'a> StackUpdate<'a> {
    /// Redeploy request that re-pulls images and prunes removed services
    pub fn redeploy(stack: &'a Stack, stack_file_content: &'a str) -> Self {
        Self {
            stack_file_content,
            env: stack.env.as_deref(),
            prune: true,
            pull_image: true,
        }
    }
}

/// A stack selected for redeploy, along with the exact document it was matched on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedStack {
    pub stack: Stack,

    /// Raw stack file as fetched, resubmitted byte-for-byte
    pub raw_document: String,

    /// Services that opted in and reference the published image
    pub services: Vec<String>,
}
