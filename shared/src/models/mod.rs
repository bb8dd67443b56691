//! Data models
//!
//! Shared between the backend mock and the gateway client. Field names
//! mirror the REST wire format; enums carry catch-all variants because
//! sheet-synced attendance data is dirty.

pub mod attendance;
pub mod employee;
pub mod stats;
pub mod sync;

// Re-exports
pub use attendance::*;
pub use employee::*;
pub use stats::*;
pub use sync::*;
