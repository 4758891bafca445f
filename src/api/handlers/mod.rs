//! Route handlers for the hook endpoint and health checks.

pub mod health;
pub mod hooks;
