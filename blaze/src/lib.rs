//! Blaze Library
//!
//! Redeploys Portainer stacks when a package registry announces a newly
//! published image.

pub mod app;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod reconcile;
pub mod server;
pub mod settings;
pub mod utils;
