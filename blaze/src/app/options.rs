//! Application configuration options

use std::time::Duration;

use secrecy::SecretString;

use crate::reconcile::matcher::{LabelScope, DEFAULT_LABEL_PREFIX};
use crate::settings::Settings;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Webhook shared secret; without one every webhook is rejected
    pub secret: Option<SecretString>,

    /// Server configuration
    pub server: ServerOptions,

    /// Portainer connection
    pub portainer: PortainerOptions,

    /// Matching and fetching
    pub reconcile: ReconcileOptions,
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            secret: Some(settings.secret.clone()),
            server: ServerOptions {
                host: settings.host.clone(),
                port: settings.port,
            },
            portainer: PortainerOptions {
                base_url: settings.portainer.url.clone(),
                api_key: settings.portainer.token.clone(),
                insecure: settings.portainer.insecure,
                timeout: Duration::from_secs(settings.portainer.timeout_secs),
            },
            reconcile: ReconcileOptions {
                label_prefix: settings.label_prefix.clone(),
                label_scope: settings.label_scope,
                fetch_concurrency: settings.fetch_concurrency,
            },
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

/// Portainer API options
#[derive(Debug, Clone)]
pub struct PortainerOptions {
    /// Base URL, e.g. `https://portainer.example.com:9443`
    pub base_url: String,

    /// Access token sent as `X-API-Key`
    pub api_key: SecretString,

    /// Skip TLS certificate validation
    pub insecure: bool,

    /// Per-request timeout
    pub timeout: Duration,
}

/// Reconciliation options
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub label_prefix: String,
    pub label_scope: LabelScope,

    /// Max concurrent stack file fetches
    pub fetch_concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            label_scope: LabelScope::default(),
            fetch_concurrency: 4,
        }
    }
}
