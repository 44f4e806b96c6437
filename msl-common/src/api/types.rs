//! Shared API request/response types
//!
//! Types used across the MSL services for health reporting and error
//! envelopes.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Health check response returned by every service's `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub database: String,
    pub timestamp: String,
}

impl HealthResponse {
    /// Build a health response stamped with the current time
    pub fn new(service: &str, database: &str) -> Self {
        let status = if database == "connected" { "ok" } else { "degraded" };
        Self {
            status: status.to_string(),
            service: service.to_string(),
            database: database.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
