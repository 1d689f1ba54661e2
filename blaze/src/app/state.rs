//! Application state management

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::app::options::AppOptions;
use crate::errors::BlazeError;
use crate::http::client::HttpClient;
use crate::reconcile::coordinator::Coordinator;
use crate::reconcile::counter::HookCounter;
use crate::reconcile::matcher::ServiceMatcher;
use crate::reconcile::signature::SignatureVerifier;

/// Main application state
pub struct AppState {
    /// HTTP client for Portainer communication
    pub http_client: Arc<HttpClient>,

    /// Webhook counter, source of correlation ids
    pub hook_counter: Arc<HookCounter>,

    /// Reconciliation pipeline
    pub coordinator: Arc<Coordinator>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Initialize application state
    pub fn init(options: &AppOptions) -> Result<Self, BlazeError> {
        info!("Initializing application state...");

        let http_client = Arc::new(HttpClient::new(&options.portainer)?);
        if options.portainer.insecure {
            info!("TLS certificate validation disabled for {}", http_client.base_url());
        }

        let hook_counter = Arc::new(HookCounter::new());
        let coordinator = Arc::new(Coordinator::new(
            SignatureVerifier::new(options.secret.clone()),
            ServiceMatcher::new(
                options.reconcile.label_prefix.clone(),
                options.reconcile.label_scope,
            ),
            http_client.clone(),
            http_client.clone(),
            hook_counter.clone(),
            options.reconcile.fetch_concurrency,
        ));

        Ok(Self {
            http_client,
            hook_counter,
            coordinator,
            started_at: Instant::now(),
        })
    }
}
