//! Shared helpers for Arrow handling and logging

pub mod arrow;
pub mod logging;
