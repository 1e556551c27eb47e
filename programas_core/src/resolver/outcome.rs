use crate::types::types::{ResolveError, SubjectRef};

/// What a single resolver run ended up doing to the page.
#[derive(Debug)]
pub enum RunOutcome {
    /// No slots on the page; nothing was requested.
    Skipped,
    /// The initial run was cancelled before it started.
    Cancelled,
    /// Per-subject results were rendered.
    Applied {
        /// Slots that received a per-subject result.
        rendered: usize,
        /// Subjects in the response with no slot left on the page.
        orphaned: Vec<SubjectRef>,
        /// Requested subjects the response said nothing about; their slots
        /// stay on `Loading`.
        missing: Vec<SubjectRef>,
    },
    /// Batch-level failure; every collected slot got the fallback link.
    Failed(ResolveError),
    /// A newer run was issued before this one's response arrived.
    Stale { token: u64, latest: u64 },
}

impl RunOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RunOutcome::Applied { .. })
    }
}
