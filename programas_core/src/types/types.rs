use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Opaque identifier of a subject (`id_materia`) as carried by a page slot.
pub type SubjectRef = String;

/// Body of the batched lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub materia_ids: Vec<SubjectRef>,
}

/// Body returned by the batched lookup endpoint.
///
/// `results` is kept as raw JSON so a single malformed item degrades that
/// item only, instead of failing the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Option<Map<String, Value>>,
}

impl BulkResponse {
    /// Splits a structurally successful response from a batch-level failure.
    pub fn into_results(self) -> Result<Map<String, Value>, ResolveError> {
        if self.status != "success" {
            return Err(ResolveError::Batch {
                message: self.message,
            });
        }
        self.results
            .ok_or_else(|| ResolveError::Decode("success response without `results`".to_string()))
    }
}

/// Outcome of the lookup for a single subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found { download_url: String },
    NotFound { manual_url: Option<String> },
    /// Server-side error or a shape we do not recognise.
    Unresolved,
}

impl Resolution {
    /// Classifies one entry of the `results` mapping.
    ///
    /// | entry                                   | resolution   |
    /// |-----------------------------------------|--------------|
    /// | `status: success` + `download_url`      | `Found`      |
    /// | `status: not_found`                     | `NotFound`   |
    /// | `status: error`, anything else          | `Unresolved` |
    pub fn from_item(item: &Value) -> Self {
        let Some(obj) = item.as_object() else {
            return Resolution::Unresolved;
        };
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match obj.get("status").and_then(Value::as_str) {
            Some("success") => match text("download_url") {
                Some(download_url) => Resolution::Found { download_url },
                None => Resolution::Unresolved,
            },
            Some("not_found") => Resolution::NotFound {
                manual_url: text("manual_url"),
            },
            _ => Resolution::Unresolved,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned status {status}")]
    HttpStatus { status: u16, message: Option<String> },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("batch lookup failed: {}", message.as_deref().unwrap_or("no message"))]
    Batch { message: Option<String> },
}

impl From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        ResolveError::Decode(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    HttpStatus(u16),

    #[error("malformed catalog: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("catalog load already in progress")]
    InProgress,
}
