//! Rollcall Client - HTTP gateway for the attendance backend
//!
//! Typed, network-based calls to the attendance REST API. All state
//! updates belong to the callers; this crate only does I/O and error
//! normalization.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod token;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{DataGateway, EmployeeQuery, HttpGateway, LogQuery};
pub use http::HttpClient;
pub use token::TokenCell;
