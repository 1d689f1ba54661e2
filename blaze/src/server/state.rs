//! Server state

use std::sync::Arc;
use std::time::Instant;

use crate::reconcile::coordinator::Coordinator;

/// Server state shared across handlers
pub struct ServerState {
    pub coordinator: Arc<Coordinator>,
    pub started_at: Instant,
}

impl ServerState {
    pub fn new(coordinator: Arc<Coordinator>, started_at: Instant) -> Self {
        Self {
            coordinator,
            started_at,
        }
    }
}
