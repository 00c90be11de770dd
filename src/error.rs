use std::fmt;

/// Error types that can occur while running the travel-planning pipeline.
///
/// Tool failures are recoverable: the search agent folds them back into its
/// reasoning as observations. Every other variant is fatal for the run and
/// propagates to the pipeline caller.
#[derive(Debug)]
pub enum PlannerError {
    /// HTTP request/response errors
    HttpError(String),
    /// Authentication and authorization errors
    AuthError(String),
    /// Invalid request parameters or format
    InvalidRequest(String),
    /// JSON serialization/deserialization errors
    JsonError(String),
    /// API response doesn't match expected format
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// A search/lookup tool failed; absorbed by the agent loop
    ToolError(String),
    /// Reference document retrieval failed; not retried
    FetchError(String),
    /// Embedding service failed; a partial index is never used
    EmbeddingError(String),
    /// Vector index upsert/query failed
    IndexError(String),
    /// Chat-completion call failed; no retry
    ModelCallError(String),
    /// Generic error
    Generic(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::HttpError(e) => write!(f, "HTTP Error: {e}"),
            PlannerError::AuthError(e) => write!(f, "Auth Error: {e}"),
            PlannerError::InvalidRequest(e) => write!(f, "Invalid Request: {e}"),
            PlannerError::JsonError(e) => write!(f, "JSON Parse Error: {e}"),
            PlannerError::ResponseFormatError {
                message,
                raw_response,
            } => {
                write!(
                    f,
                    "Response Format Error: {message}. Raw response: {raw_response}"
                )
            }
            PlannerError::ToolError(e) => write!(f, "Tool Error: {e}"),
            PlannerError::FetchError(e) => write!(f, "Fetch Error: {e}"),
            PlannerError::EmbeddingError(e) => write!(f, "Embedding Error: {e}"),
            PlannerError::IndexError(e) => write!(f, "Index Error: {e}"),
            PlannerError::ModelCallError(e) => write!(f, "Model Call Error: {e}"),
            PlannerError::Generic(e) => write!(f, "Error: {e}"),
        }
    }
}

impl std::error::Error for PlannerError {}

/// Converts reqwest HTTP errors into PlannerErrors
impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::HttpError(err.to_string())
    }
}

/// Converts JSON serialization errors into PlannerErrors
impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::JsonError(err.to_string())
    }
}
