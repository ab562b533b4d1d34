pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod services;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;
pub mod validation;

pub use error::{ApiError, ApiResult};
