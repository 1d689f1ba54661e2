//! Portainer API client

pub mod client;
pub mod stacks;
