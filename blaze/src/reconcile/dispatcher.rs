//! Sequential stack redeploys

use tracing::{error, info};

use crate::errors::DispatchFailure;
use crate::models::stack::{MatchedStack, StackId};
use crate::reconcile::catalog::StackUpdater;

/// Per-request outcome of all redeploys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Stacks redeployed successfully, in dispatch order
    pub updated: Vec<StackId>,

    /// Failed redeploys, in dispatch order
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.updated.len() + self.failures.len()
    }

    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    pub fn first_failure(&self) -> Option<&DispatchFailure> {
        self.failures.first()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Redeploy matched stacks one after another.
///
/// Each redeploy completes before the next one starts. A failed redeploy is
/// recorded and the remaining stacks are still attempted; nothing is retried.
pub async fn dispatch(
    updater: &dyn StackUpdater,
    hook_id: u64,
    matched: &[MatchedStack],
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for (i, entry) in matched.iter().enumerate() {
        let stack = &entry.stack;
        info!(
            "[#{}] updating stack {} ({}) [{}/{}]",
            hook_id,
            stack.name,
            stack.id,
            i + 1,
            matched.len()
        );

        match updater.redeploy(stack, &entry.raw_document).await {
            Ok(()) => {
                info!("[#{}] updated stack {} ({})", hook_id, stack.name, stack.id);
                report.updated.push(stack.id);
            }
            Err(e) => {
                error!(
                    "[#{}] failed to update stack {} ({}): {}",
                    hook_id, stack.name, stack.id, e
                );
                report.failures.push(DispatchFailure {
                    stack_id: stack.id,
                    stack_name: stack.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
