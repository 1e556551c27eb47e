use async_trait::async_trait;

use crate::types::types::{BulkResponse, ResolveError, SubjectRef};

/// Something that can answer a batched programa lookup.
///
/// Implementations report transport problems as `Err`; an application-level
/// failure (`status != "success"`) is still an `Ok(BulkResponse)` and is
/// interpreted by the resolver.
#[async_trait]
pub trait ProgramSource: Send + Sync {
    async fn fetch_bulk(&self, subjects: &[SubjectRef]) -> Result<BulkResponse, ResolveError>;
}
