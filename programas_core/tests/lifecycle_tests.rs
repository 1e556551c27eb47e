use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use programas_core::config::ResolverConfig;
use programas_core::lifecycle::{PageLifecycle, TabState};
use programas_core::resolver::{BulkResolver, RunOutcome};
use programas_core::slot::{Affordance, MemoryPage};
use programas_core::source::ProgramSource;
use programas_core::types::types::{BulkResponse, ResolveError, SubjectRef};

const DELAY: Duration = Duration::from_millis(500);

/// Answers every request immediately with a download link per subject.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl ProgramSource for CountingSource {
    async fn fetch_bulk(&self, subjects: &[SubjectRef]) -> Result<BulkResponse, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let results: serde_json::Map<String, serde_json::Value> = subjects
            .iter()
            .map(|s| {
                (
                    s.clone(),
                    json!({"status": "success", "download_url": format!("https://p/{}", s)}),
                )
            })
            .collect();
        Ok(serde_json::from_value(json!({"status": "success", "results": results}))?)
    }
}

fn make_lifecycle(subjects: &[&str]) -> (PageLifecycle, Arc<CountingSource>, Arc<MemoryPage>) {
    let source = Arc::new(CountingSource::default());
    let config = ResolverConfig::builder("unused").with_initial_delay(DELAY).build();
    let resolver = Arc::new(BulkResolver::new(source.clone(), &config));
    let page = Arc::new(MemoryPage::new(subjects.iter().copied()));
    let lifecycle = PageLifecycle::new(resolver, page.clone(), config.initial_delay);
    (lifecycle, source, page)
}

// ---------------------------------------------------------------
// Initial load
// ---------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_active_tab_runs_after_delay() {
    let (lifecycle, source, page) = make_lifecycle(&["1", "2"]);

    let handle = lifecycle.on_load(TabState::Active).expect("initial run scheduled");

    tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(page.affordance_of("1"), Some(Affordance::Fetch));

    let outcome = handle.await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        page.affordance_of("2"),
        Some(Affordance::Download { url: "https://p/2".to_string() })
    );
}

#[tokio::test(start_paused = true)]
async fn test_inactive_tab_waits_for_tab_shown() {
    let (lifecycle, source, page) = make_lifecycle(&["1"]);

    assert!(lifecycle.on_load(TabState::Inactive).is_none());
    tokio::time::sleep(DELAY * 4).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);

    let outcome = lifecycle.on_tab_shown().await.unwrap();
    assert!(outcome.is_applied());
    assert!(page.affordance_of("1").unwrap().is_terminal());
}

#[tokio::test(start_paused = true)]
async fn test_every_tab_shown_starts_a_new_run() {
    let (lifecycle, source, _page) = make_lifecycle(&["1"]);

    lifecycle.on_tab_shown().await.unwrap();
    lifecycle.on_tab_shown().await.unwrap();
    lifecycle.on_tab_shown().await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_page_without_tab_runs_when_it_has_slots() {
    let (lifecycle, source, _page) = make_lifecycle(&["1"]);
    let handle = lifecycle.on_load(TabState::Absent).expect("initial run scheduled");
    assert!(handle.await.unwrap().is_applied());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    let (empty, empty_source, _) = make_lifecycle(&[]);
    assert!(empty.on_load(TabState::Absent).is_none());
    assert!(matches!(empty.on_tab_shown().await.unwrap(), RunOutcome::Skipped));
    assert_eq!(empty_source.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_initial_run() {
    let (lifecycle, source, page) = make_lifecycle(&["1"]);

    let handle = lifecycle.on_load(TabState::Active).expect("initial run scheduled");
    tokio::time::sleep(DELAY / 2).await;
    lifecycle.shutdown();

    assert!(matches!(handle.await.unwrap(), RunOutcome::Cancelled));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(page.affordance_of("1"), Some(Affordance::Fetch));
}
