//! HTTP plumbing for the StackSift REST API.

pub mod client;
pub mod endpoints;
pub mod transport;

pub use client::ApiClient;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, RequestBody, Transport};
