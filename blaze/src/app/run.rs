//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::errors::BlazeError;
use crate::server::serve::serve;
use crate::server::state::ServerState;

/// Run the Blaze service until the shutdown signal resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), BlazeError> {
    info!("Initializing Blaze...");

    let app_state = AppState::init(&options)?;
    let server_state = Arc::new(ServerState::new(
        app_state.coordinator.clone(),
        app_state.started_at,
    ));

    let handle = serve(&options.server, server_state, shutdown_signal).await?;
    let result = handle
        .await
        .map_err(|e| BlazeError::ServerError(e.to_string()))?;

    info!(
        "Handled {} webhooks, shutting down",
        app_state.hook_counter.count()
    );
    result
}
