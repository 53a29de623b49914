//! Utility modules.

pub mod retry;
