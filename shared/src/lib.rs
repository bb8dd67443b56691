//! Shared types for the rollcall dashboard
//!
//! DTOs exchanged with the attendance backend, used by both the
//! gateway crate and the dashboard core. No I/O lives here.

pub mod auth;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use auth::{LoginRequest, LoginResponse, UserInfo};
