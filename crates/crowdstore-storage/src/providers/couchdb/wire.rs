//! Typed CouchDB request and response bodies, and status-to-error mapping.

use std::collections::BTreeMap;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crowdstore_core::error::{AppError, ErrorKind};
use crowdstore_core::result::AppResult;
use crowdstore_core::types::JobIdentity;

/// Body of the metadata document created for each saved file.
#[derive(Debug, Clone, Serialize)]
pub struct FileDocument<'a> {
    pub job: &'a JobIdentity,
}

/// Response to a successful document write (`PUT` or `DELETE`).
#[derive(Debug, Clone, Deserialize)]
pub struct WriteResponse {
    pub id: String,
    pub rev: String,
}

/// Error body CouchDB returns alongside non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouchFailure {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub reason: String,
}

/// One view in a design document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

/// A design document. Fields this client does not manage are carried through
/// untouched when the document is replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub views: BTreeMap<String, ViewDefinition>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Response of a view query.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewResponse {
    pub rows: Vec<ViewRow>,
}

/// One row of the `files_by_job` view.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewRow {
    pub id: String,
    pub key: String,
    pub value: RowValue,
}

/// The value emitted for each row: the document's current revision.
#[derive(Debug, Clone, Deserialize)]
pub struct RowValue {
    pub rev: String,
}

/// Read a response body and decode it into `T`, failing with
/// `UnexpectedResponse` if it does not have the expected shape.
pub async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> AppResult<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        AppError::with_source(
            ErrorKind::UnexpectedResponse,
            format!("Unexpected response body for {what}: {e}"),
            e,
        )
    })
}

/// Convert a non-success response into an error.
///
/// 409 is a revision conflict and 5xx means the store is unavailable.
/// Anything else is reported as an unexpected response. Callers handle
/// statuses that carry operation-specific meaning before calling this.
pub async fn failure(response: Response, what: &str) -> AppError {
    let status = response.status();
    let detail = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<CouchFailure>(&body).unwrap_or_default(),
        Err(e) => {
            return AppError::with_source(
                ErrorKind::StoreUnavailable,
                format!("{what} failed with {status} and an unreadable body"),
                e,
            );
        }
    };
    let message = if detail.error.is_empty() {
        format!("{what} failed with {status}")
    } else {
        format!("{what} failed with {status}: {} ({})", detail.error, detail.reason)
    };

    match status {
        StatusCode::CONFLICT => AppError::store_conflict(message),
        s if s.is_server_error() => AppError::store_unavailable(message),
        _ => AppError::unexpected_response(message),
    }
}
