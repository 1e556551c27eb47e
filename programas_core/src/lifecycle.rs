use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::resolver::{BulkResolver, RunOutcome};
use crate::slot::page::SlotPage;

/// State of the subjects tab when the page finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    /// The page shows its subjects directly, without a tab.
    Absent,
    Inactive,
    Active,
}

/// Decides when the resolver runs for one page.
///
/// | Event                         | Action                                   |
/// |-------------------------------|------------------------------------------|
/// | load, tab active              | run after `initial_delay`                |
/// | load, no tab, slots present   | run after `initial_delay`                |
/// | load, tab inactive / no slots | nothing                                  |
/// | tab shown                     | run now                                  |
/// | shutdown                      | cancel a pending delayed run             |
///
/// Requests already in flight are never cancelled.
pub struct PageLifecycle {
    resolver: Arc<BulkResolver>,
    page: Arc<dyn SlotPage>,
    initial_delay: Duration,
    shutdown: CancellationToken,
}

impl PageLifecycle {
    pub fn new(resolver: Arc<BulkResolver>, page: Arc<dyn SlotPage>, initial_delay: Duration) -> Self {
        Self {
            resolver,
            page,
            initial_delay,
            shutdown: CancellationToken::new(),
        }
    }

    /// Called once the page has loaded. Returns the delayed run, if any.
    pub fn on_load(&self, tab: TabState) -> Option<JoinHandle<RunOutcome>> {
        match tab {
            TabState::Active => {
                log::debug!("Subjects tab is active on load");
                Some(self.schedule_initial())
            }
            TabState::Inactive => None,
            TabState::Absent => {
                let count = self.page.slots().len();
                if count == 0 {
                    log::info!("No subject slots found on page");
                    return None;
                }
                log::info!("Initializing programa fetching for {} subjects", count);
                Some(self.schedule_initial())
            }
        }
    }

    /// Called every time the subjects tab becomes visible.
    pub fn on_tab_shown(&self) -> JoinHandle<RunOutcome> {
        self.resolver.resolve(Arc::clone(&self.page))
    }

    /// Cancels a delayed initial run that has not started yet.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn schedule_initial(&self) -> JoinHandle<RunOutcome> {
        let resolver = Arc::clone(&self.resolver);
        let page = Arc::clone(&self.page);
        let token = self.shutdown.clone();
        let delay = self.initial_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => RunOutcome::Cancelled,
                _ = tokio::time::sleep(delay) => resolver.run(page.as_ref()).await,
            }
        })
    }
}
