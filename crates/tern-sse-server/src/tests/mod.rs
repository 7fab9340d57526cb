//! Test modules for tern-sse-server
//!
//! Publisher and registry lifecycle tests run under paused tokio time so the
//! feed timer is deterministic.

pub mod publisher_tests;
