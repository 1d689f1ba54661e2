//! Finite state machine for one reconciliation request

use serde::{Deserialize, Serialize};

/// Reconciliation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileState {
    /// Webhook received, correlation id assigned
    Received,

    /// Signature verified
    Authenticated,

    /// Payload validated
    Validated,

    /// Stack list fetched
    Enumerated,

    /// Stack files fetched and matched
    Matched,

    /// Redeploys issued
    Dispatched,

    /// All redeploys succeeded
    Completed,

    /// Bad or missing signature
    Unauthenticated,

    /// Invalid payload
    Rejected,

    /// Nothing to redeploy
    #[serde(rename = "noop")]
    NoOp,

    /// Platform failure or failed redeploy
    Failed,
}

impl ReconcileState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReconcileState::Completed
                | ReconcileState::Unauthenticated
                | ReconcileState::Rejected
                | ReconcileState::NoOp
                | ReconcileState::Failed
        )
    }
}

/// Reconciliation event
#[derive(Debug, Clone)]
pub enum ReconcileEvent {
    Authenticate,
    AuthFailed,
    Validate,
    Reject(String),
    Enumerate,
    NoStacks,
    Match,
    NoMatches,
    Dispatch,
    Complete,
    UpstreamFailed(String),
    DispatchFailed(String),
}

/// Reconciliation FSM
#[derive(Debug, Clone)]
pub struct ReconcileFsm {
    state: ReconcileState,
    error: Option<String>,
}

impl ReconcileFsm {
    /// Create a new FSM in received state
    pub fn new() -> Self {
        Self {
            state: ReconcileState::Received,
            error: None,
        }
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: ReconcileEvent) -> Result<ReconcileState, String> {
        use ReconcileEvent as E;
        use ReconcileState as S;

        let new_state = match (self.state, &event) {
            (S::Received, E::Authenticate) => S::Authenticated,
            (S::Received, E::AuthFailed) => S::Unauthenticated,

            (S::Authenticated, E::Validate) => S::Validated,
            (S::Authenticated, E::Reject(reason)) => {
                self.error = Some(reason.clone());
                S::Rejected
            }

            (S::Validated, E::Enumerate) => S::Enumerated,

            (S::Enumerated, E::Match) => S::Matched,
            (S::Enumerated, E::NoStacks) => S::NoOp,

            (S::Matched, E::Dispatch) => S::Dispatched,
            (S::Matched, E::NoMatches) => S::NoOp,

            (S::Dispatched, E::Complete) => S::Completed,
            (S::Dispatched, E::DispatchFailed(err)) => {
                self.error = Some(err.clone());
                S::Failed
            }

            (S::Validated | S::Enumerated, E::UpstreamFailed(err)) => {
                self.error = Some(err.clone());
                S::Failed
            }

            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(new_state)
    }
}

impl Default for ReconcileFsm {
    fn default() -> Self {
        Self::new()
    }
}
