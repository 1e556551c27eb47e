use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use super::outcome::RunOutcome;
use super::render::{affordance_for, batch_failure};
use crate::config::{ResolverConfig, StalePolicy};
use crate::slot::affordance::Affordance;
use crate::slot::page::{SlotId, SlotPage};
use crate::source::program_source::ProgramSource;
use crate::types::types::{Resolution, ResolveError, SubjectRef};

/// Identity of a page: the address of the object behind `&dyn SlotPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PageKey(usize);

impl PageKey {
    fn of(page: &dyn SlotPage) -> Self {
        PageKey(page as *const dyn SlotPage as *const () as usize)
    }
}

/// A run whose slots are already on `Loading` and whose request is not yet sent.
struct PendingRun {
    page: PageKey,
    token: u64,
    slots: Vec<SlotId>,
    subjects: Vec<SubjectRef>,
}

/// Resolves programa download links for every slot on a page with one
/// batched request, then reconciles each slot with its result.
///
/// # Run lifecycle
///
/// | Phase                | Page effect                                     |
/// |----------------------|-------------------------------------------------|
/// | no slots             | none, no request                                |
/// | start (synchronous)  | every slot → `Loading`                          |
/// | `status: success`    | each listed subject → its affordance            |
/// | failure of any kind  | every collected slot → manual-search fallback   |
///
/// Runs are independent. With `StalePolicy::Discard` each run takes a token
/// and only the latest token issued for the same page may touch that page;
/// runs on other pages never make each other stale. With
/// `StalePolicy::Apply` responses are applied in arrival order.
pub struct BulkResolver {
    source: Arc<dyn ProgramSource>,
    manual_search_url: String,
    stale_policy: StalePolicy,
    latest_token: AtomicU64,
    /// Latest token issued per page.
    page_tokens: Mutex<HashMap<PageKey, u64>>,
}

impl BulkResolver {
    pub fn new(source: Arc<dyn ProgramSource>, config: &ResolverConfig) -> Self {
        Self {
            source,
            manual_search_url: config.manual_search_url.clone(),
            stale_policy: config.stale_policy,
            latest_token: AtomicU64::new(0),
            page_tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Fire-and-forget entry point.
    ///
    /// Slots are switched to `Loading` before this returns; the request and
    /// reconciliation run on a spawned task. Awaiting the handle is optional.
    /// Must be called from within a tokio runtime.
    pub fn resolve(self: &Arc<Self>, page: Arc<dyn SlotPage>) -> JoinHandle<RunOutcome> {
        match self.begin(page.as_ref()) {
            None => tokio::spawn(async { RunOutcome::Skipped }),
            Some(run) => {
                let this = Arc::clone(self);
                tokio::spawn(async move { this.complete(run, page.as_ref()).await })
            }
        }
    }

    /// Same as `resolve`, but runs on the caller's task.
    pub async fn run(&self, page: &dyn SlotPage) -> RunOutcome {
        match self.begin(page) {
            None => RunOutcome::Skipped,
            Some(run) => self.complete(run, page).await,
        }
    }

    /// Token of the most recently started run on any page (0 before the
    /// first one).
    pub fn latest_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    fn page_tokens(&self) -> MutexGuard<'_, HashMap<PageKey, u64>> {
        self.page_tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self, page: &dyn SlotPage) -> Option<PendingRun> {
        let bindings = page.slots();
        if bindings.is_empty() {
            log::info!("No programa slots on page, skipping lookup");
            return None;
        }

        let page_key = PageKey::of(page);
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.page_tokens().insert(page_key, token);
        let (slots, subjects): (Vec<SlotId>, Vec<SubjectRef>) =
            bindings.into_iter().map(|b| (b.id, b.subject)).unzip();

        page.render_all(&slots, &Affordance::Loading);
        log::info!(
            "Batch fetching programa info for {} subjects (run {})",
            subjects.len(),
            token
        );

        Some(PendingRun {
            page: page_key,
            token,
            slots,
            subjects,
        })
    }

    async fn complete(&self, run: PendingRun, page: &dyn SlotPage) -> RunOutcome {
        let response = self.source.fetch_bulk(&run.subjects).await;

        if self.stale_policy == StalePolicy::Discard {
            let latest = self.page_tokens().get(&run.page).copied().unwrap_or(run.token);
            if latest != run.token {
                log::warn!(
                    "Dropping response of run {}; run {} superseded it",
                    run.token,
                    latest
                );
                return RunOutcome::Stale {
                    token: run.token,
                    latest,
                };
            }
        }

        match response.and_then(|r| r.into_results()) {
            Ok(results) => self.apply(&run, results, page),
            Err(error) => {
                match &error {
                    ResolveError::Batch { .. } => {
                        log::error!("Bulk programa fetch failed: {}", error)
                    }
                    _ => log::error!("Error in bulk programa fetch: {}", error),
                }
                page.render_all(&run.slots, &batch_failure(&self.manual_search_url));
                RunOutcome::Failed(error)
            }
        }
    }

    fn apply(&self, run: &PendingRun, results: Map<String, Value>, page: &dyn SlotPage) -> RunOutcome {
        let mut rendered = 0;
        let mut orphaned = Vec::new();

        for (subject, item) in &results {
            let Some(slot) = page.find(subject) else {
                log::warn!("No slot left on page for subject {}", subject);
                orphaned.push(subject.clone());
                continue;
            };
            let affordance = affordance_for(Resolution::from_item(item), &self.manual_search_url);
            log::debug!("Subject {} -> {:?}", subject, affordance);
            page.render(slot, affordance);
            rendered += 1;
        }

        let mut seen = HashSet::new();
        let missing: Vec<SubjectRef> = run
            .subjects
            .iter()
            .filter(|s| !results.contains_key(s.as_str()) && seen.insert(s.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "Response had no entry for {} subjects; their slots stay loading",
                missing.len()
            );
        }

        log::info!("Bulk programa fetch completed (run {})", run.token);
        RunOutcome::Applied {
            rendered,
            orphaned,
            missing,
        }
    }
}
