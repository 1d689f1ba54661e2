//! Reconciliation pipeline

pub mod catalog;
pub mod coordinator;
pub mod counter;
pub mod dispatcher;
pub mod fsm;
pub mod matcher;
pub mod payload;
pub mod signature;
