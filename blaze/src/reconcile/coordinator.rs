//! Request-scoped reconciliation pipeline

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info, warn};

use crate::errors::{CatalogError, DispatchFailure, RejectReason};
use crate::models::compose::DeploymentDocument;
use crate::models::stack::{MatchedStack, Stack};
use crate::reconcile::catalog::{StackCatalog, StackUpdater};
use crate::reconcile::counter::HookCounter;
use crate::reconcile::dispatcher::dispatch;
use crate::reconcile::fsm::{ReconcileEvent, ReconcileFsm, ReconcileState};
use crate::reconcile::matcher::ServiceMatcher;
use crate::reconcile::payload;
use crate::reconcile::signature::SignatureVerifier;

pub const INVALID_SIGNATURE: &str = "INVALID_SIGNATURE";
pub const IGNORING_INVALID_ACTION: &str = "IGNORING_INVALID_ACTION";
pub const INVALID_PAYLOAD_MISSING_PACKAGE_URL: &str = "INVALID_PAYLOAD_MISSING_PACKAGE_URL";
pub const NO_SERVICE_FOUND_FOR_PACKAGE_URL: &str = "NO_SERVICE_FOUND_FOR_PACKAGE_URL";
pub const NO_STACK_FILE_FOUND: &str = "NO_STACK_FILE_FOUND";
pub const INVALID_STACK_FILE: &str = "INVALID_STACK_FILE";
pub const UPSTREAM_UNAVAILABLE: &str = "UPSTREAM_UNAVAILABLE";
pub const STACK_UPDATE_FAILED: &str = "STACK_UPDATE_FAILED";

/// Terminal outcome of one webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every matched stack was redeployed
    Updated { artifact: String, updated: usize },

    /// Bad or missing signature
    Unauthenticated,

    /// Payload rejected before any platform call
    Rejected(RejectReason),

    /// No stack opted in for the published image
    NoMatch { artifact: String },

    /// Stacks could not be enumerated, fetched or parsed
    UpstreamFailed(CatalogError),

    /// At least one redeploy failed; `updated` counts the ones that succeeded
    DispatchFailed {
        artifact: String,
        updated: usize,
        failed: usize,
        first_failure: DispatchFailure,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Updated { .. })
    }

    /// Client error caused by the request itself or by the opt-in policy
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Outcome::Unauthenticated | Outcome::Rejected(_) | Outcome::NoMatch { .. }
        )
    }

    /// Stable, human readable response body
    pub fn message(&self) -> String {
        match self {
            Outcome::Updated { artifact, updated } => format!(
                "done handling webhook for package {} - updated {} stacks",
                artifact, updated
            ),
            Outcome::Unauthenticated => INVALID_SIGNATURE.to_string(),
            Outcome::Rejected(RejectReason::InvalidAction(_)) => {
                IGNORING_INVALID_ACTION.to_string()
            }
            Outcome::Rejected(RejectReason::MissingArtifactLocator) => {
                INVALID_PAYLOAD_MISSING_PACKAGE_URL.to_string()
            }
            Outcome::NoMatch { .. } => NO_SERVICE_FOUND_FOR_PACKAGE_URL.to_string(),
            Outcome::UpstreamFailed(CatalogError::NoDocumentFound { .. }) => {
                NO_STACK_FILE_FOUND.to_string()
            }
            Outcome::UpstreamFailed(CatalogError::InvalidDocument { .. }) => {
                INVALID_STACK_FILE.to_string()
            }
            Outcome::UpstreamFailed(
                CatalogError::UpstreamUnavailable(_) | CatalogError::NoStacksFound,
            ) => UPSTREAM_UNAVAILABLE.to_string(),
            Outcome::DispatchFailed {
                updated,
                failed,
                first_failure,
                ..
            } => format!(
                "{}: stack {} ({}): {} - updated {} of {} stacks",
                STACK_UPDATE_FAILED,
                first_failure.stack_name,
                first_failure.stack_id,
                first_failure.reason,
                updated,
                updated + failed
            ),
        }
    }
}

/// Result of one reconciliation, produced exactly once per webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub correlation_id: u64,
    pub matched_count: usize,
    pub state: ReconcileState,
    pub outcome: Outcome,
}

/// Drives a webhook through verification, matching and dispatch
pub struct Coordinator {
    verifier: SignatureVerifier,
    matcher: Arc<ServiceMatcher>,
    catalog: Arc<dyn StackCatalog>,
    updater: Arc<dyn StackUpdater>,
    counter: Arc<HookCounter>,
    fetch_concurrency: usize,
}

impl Coordinator {
    pub fn new(
        verifier: SignatureVerifier,
        matcher: ServiceMatcher,
        catalog: Arc<dyn StackCatalog>,
        updater: Arc<dyn StackUpdater>,
        counter: Arc<HookCounter>,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            verifier,
            matcher: Arc::new(matcher),
            catalog,
            updater,
            counter,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    pub fn counter(&self) -> &HookCounter {
        &self.counter
    }

    /// Handle one webhook given its raw body and claimed signature
    pub async fn reconcile(&self, body: &[u8], signature: Option<&str>) -> ReconciliationResult {
        let hook_id = self.counter.next_id();
        let mut run = Run::new(hook_id);
        debug!("[#{}] received webhook ({} bytes)", hook_id, body.len());

        if !self.verifier.verify(body, signature) {
            warn!("[#{}] ignoring invalid signature", hook_id);
            run.advance(ReconcileEvent::AuthFailed);
            return run.finish(Outcome::Unauthenticated);
        }
        run.advance(ReconcileEvent::Authenticate);

        let notification = match payload::extract(body) {
            Ok(notification) => notification,
            Err(reason) => {
                info!("[#{}] {}", hook_id, reason);
                run.advance(ReconcileEvent::Reject(reason.to_string()));
                return run.finish(Outcome::Rejected(reason));
            }
        };
        run.advance(ReconcileEvent::Validate);
        let artifact = notification.artifact;
        info!(
            "[#{}] received webhook with action {} for package {}",
            hook_id, notification.action, artifact
        );

        let stacks = match self.catalog.list_stacks().await {
            Ok(stacks) if !stacks.is_empty() => {
                run.advance(ReconcileEvent::Enumerate);
                stacks
            }
            Ok(_) | Err(CatalogError::NoStacksFound) => {
                warn!("[#{}] no stacks found", hook_id);
                run.advance(ReconcileEvent::Enumerate);
                run.advance(ReconcileEvent::NoStacks);
                return run.finish(Outcome::NoMatch { artifact });
            }
            Err(e) => {
                error!("[#{}] failed to list stacks: {}", hook_id, e);
                run.advance(ReconcileEvent::UpstreamFailed(e.to_string()));
                return run.finish(Outcome::UpstreamFailed(e));
            }
        };
        debug!("[#{}] checking {} stacks", hook_id, stacks.len());

        let matched = match self.match_stacks(hook_id, stacks, &artifact).await {
            Ok(matched) => matched,
            Err(e) => {
                error!("[#{}] failed to evaluate stacks: {}", hook_id, e);
                run.advance(ReconcileEvent::UpstreamFailed(e.to_string()));
                return run.finish(Outcome::UpstreamFailed(e));
            }
        };
        run.advance(ReconcileEvent::Match);
        run.matched_count = matched.len();

        if matched.is_empty() {
            info!(
                "[#{}] invalid webhook. no service found for package {}",
                hook_id, artifact
            );
            run.advance(ReconcileEvent::NoMatches);
            return run.finish(Outcome::NoMatch { artifact });
        }

        info!("[#{}] updating {} stacks", hook_id, matched.len());
        run.advance(ReconcileEvent::Dispatch);
        let report = dispatch(self.updater.as_ref(), hook_id, &matched).await;

        match report.first_failure() {
            None => {
                info!(
                    "[#{}] done handling webhook for package {} - updated {} stacks",
                    hook_id,
                    artifact,
                    report.updated_count()
                );
                run.advance(ReconcileEvent::Complete);
                run.finish(Outcome::Updated {
                    artifact,
                    updated: report.updated_count(),
                })
            }
            Some(first_failure) => {
                error!(
                    "[#{}] updated {} of {} stacks for package {}, first failure: {}",
                    hook_id,
                    report.updated_count(),
                    report.attempted(),
                    artifact,
                    first_failure
                );
                run.advance(ReconcileEvent::DispatchFailed(first_failure.to_string()));
                let first_failure = first_failure.clone();
                run.finish(Outcome::DispatchFailed {
                    artifact,
                    updated: report.updated_count(),
                    failed: report.failures.len(),
                    first_failure,
                })
            }
        }
    }

    /// Fetch and match every stack against the published image.
    ///
    /// Fetches run concurrently but results keep catalog order. Stacks listed
    /// twice are evaluated once. Any fetch or parse failure aborts the whole
    /// evaluation.
    pub async fn match_stacks(
        &self,
        hook_id: u64,
        stacks: Vec<Stack>,
        artifact: &str,
    ) -> Result<Vec<MatchedStack>, CatalogError> {
        let mut seen = HashSet::new();
        let stacks: Vec<Stack> = stacks.into_iter().filter(|s| seen.insert(s.id)).collect();
        let artifact: Arc<str> = Arc::from(artifact);

        let evaluated: Vec<Option<MatchedStack>> = stream::iter(stacks)
            .map(|stack| {
                evaluate_stack(
                    self.catalog.clone(),
                    self.matcher.clone(),
                    hook_id,
                    stack,
                    artifact.clone(),
                )
            })
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await?;

        Ok(evaluated.into_iter().flatten().collect())
    }
}

async fn evaluate_stack(
    catalog: Arc<dyn StackCatalog>,
    matcher: Arc<ServiceMatcher>,
    hook_id: u64,
    stack: Stack,
    artifact: Arc<str>,
) -> Result<Option<MatchedStack>, CatalogError> {
    let raw_document = catalog.fetch_document(stack.id).await?;
    let document =
        DeploymentDocument::parse(&raw_document).map_err(|e| CatalogError::InvalidDocument {
            stack_id: stack.id,
            reason: e.to_string(),
        })?;

    let verdict = matcher.evaluate(&document, &artifact);
    if !verdict.is_match() {
        debug!(
            "[#{}] no opted-in service in stack {} ({})",
            hook_id, stack.name, stack.id
        );
        return Ok(None);
    }

    info!(
        "[#{}] found service {} in stack {} ({})",
        hook_id,
        verdict.services.join(", "),
        stack.name,
        stack.id
    );
    Ok(Some(MatchedStack {
        stack,
        raw_document,
        services: verdict.services,
    }))
}

/// Per-request bookkeeping
struct Run {
    hook_id: u64,
    fsm: ReconcileFsm,
    matched_count: usize,
}

impl Run {
    fn new(hook_id: u64) -> Self {
        Self {
            hook_id,
            fsm: ReconcileFsm::new(),
            matched_count: 0,
        }
    }

    fn advance(&mut self, event: ReconcileEvent) {
        match self.fsm.process(event) {
            Ok(state) => debug!("[#{}] -> {:?}", self.hook_id, state),
            Err(e) => error!("[#{}] {}", self.hook_id, e),
        }
    }

    fn finish(self, outcome: Outcome) -> ReconciliationResult {
        ReconciliationResult {
            correlation_id: self.hook_id,
            matched_count: self.matched_count,
            state: self.fsm.state(),
            outcome,
        }
    }
}
