//! HTTP client module for sonar-export

pub mod client;
pub mod endpoints;
pub use client::{describe_request, SonarClient};
pub use endpoints::{ListEndpoint, TotalLocation};
