//! Data models

pub mod compose;
pub mod notification;
pub mod stack;
