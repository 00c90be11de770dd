use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Inbound event for the entry-point adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanEvent {
    /// Free-text trip description
    pub input: String,
}

/// Response body wrapping the synthesized itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanBody {
    /// The itinerary text
    pub message: String,
}

/// HTTP-shaped response returned by the entry-point adapter.
#[derive(Debug, Clone, Serialize)]
pub struct PlanHttpResponse {
    /// HTTP status code
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: PlanBody,
}

/// Structured error body returned by the HTTP server on pipeline failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short description of what failed
    pub error: String,
}
