//! Error types for the query server
//!
//! Provides unified error handling using thiserror.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::FailureResponse;

// == Query Error Enum ==
/// Unified error type for feature queries.
///
/// Every variant is recoverable: handlers turn it into a failure envelope and
/// the process keeps serving.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Missing, empty or non-numeric request parameter
    #[error("{0}")]
    InvalidQuery(String),

    /// Feature file missing, unreadable or too slow to load
    #[error("{0}")]
    DataSource(String),

    /// Feature file read but could not be parsed
    #[error("{0}")]
    MalformedData(String),

    /// Unexpected failure while computing a result
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    // == Result Code ==
    /// Returns the `result` field value used in failure envelopes.
    pub fn result_code(&self) -> &'static str {
        match self {
            QueryError::DataSource(_) => "error_datasource",
            QueryError::InvalidQuery(_) | QueryError::MalformedData(_) | QueryError::Internal(_) => {
                "error_bad_request"
            }
        }
    }
}

// == IntoResponse Implementation ==
/// Errors travel in the body; the HTTP status stays 200.
impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        Json(FailureResponse::from_error(&self)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query server.
pub type Result<T> = std::result::Result<T, QueryError>;
