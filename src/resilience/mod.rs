//! Retry for idempotent engine reads.

pub mod retry;
