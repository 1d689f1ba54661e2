//! Notification payload validation

use crate::errors::RejectReason;
use crate::models::notification::{Notification, WebhookPayload, PUBLISHED_ACTION};

/// Parse and validate a raw webhook body.
///
/// A body that is not a JSON object of the expected shape carries no usable
/// action and is rejected as [`RejectReason::InvalidAction`].
pub fn extract(body: &[u8]) -> Result<Notification, RejectReason> {
    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|_| RejectReason::InvalidAction(None))?;
    extract_notification(&payload)
}

/// Validate an already parsed webhook payload
pub fn extract_notification(payload: &WebhookPayload) -> Result<Notification, RejectReason> {
    match payload.action.as_deref() {
        Some(PUBLISHED_ACTION) => {}
        other => return Err(RejectReason::InvalidAction(other.map(str::to_string))),
    }

    match payload.package_url() {
        Some(url) if !url.is_empty() => Ok(Notification {
            action: PUBLISHED_ACTION.to_string(),
            artifact: url.to_string(),
        }),
        _ => Err(RejectReason::MissingArtifactLocator),
    }
}
