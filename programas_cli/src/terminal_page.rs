use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use programas_core::slot::{Affordance, MemoryPage, SlotBinding, SlotId, SlotPage};

/// Renders programa slots as terminal lines.
///
/// One spinner line per subject, all under a shared `MultiProgress` so they
/// redraw cleanly. Slot state itself lives in a `MemoryPage`.
pub struct TerminalPage {
    inner: MemoryPage,
    bars: Vec<ProgressBar>,
    _multi: MultiProgress,
}

impl TerminalPage {
    pub fn new(subjects: &[String]) -> Self {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bars = subjects
            .iter()
            .map(|subject| {
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(style.clone());
                pb.set_message(format!("{}  {}", subject, Affordance::Fetch.caption()));
                pb
            })
            .collect();

        Self {
            inner: MemoryPage::new(subjects.iter().cloned()),
            bars,
            _multi: multi,
        }
    }

    fn show(&self, slot: SlotId, affordance: &Affordance) {
        let Some(bar) = self.bars.get(slot.0) else {
            return;
        };
        let subject = self.inner.subject(slot).unwrap_or_default();
        let line = match affordance.url() {
            Some(url) => format!("{}  {}  {}", subject, affordance.caption(), url),
            None => format!("{}  {}", subject, affordance.caption()),
        };

        match affordance {
            Affordance::Loading => {
                bar.enable_steady_tick(Duration::from_millis(100));
                bar.set_message(line);
            }
            Affordance::Fetch => {
                bar.disable_steady_tick();
                bar.abandon_with_message(line);
            }
            Affordance::Download { .. } | Affordance::ManualSearch { .. } => {
                bar.finish_with_message(line);
            }
        }
    }

    /// Final state of every slot: one tab-separated line each, or the slot
    /// markup when `html` is set.
    pub fn summary(&self, html: bool) -> Vec<String> {
        self.inner
            .snapshot()
            .into_iter()
            .map(|(subject, affordance)| {
                if html {
                    format!(
                        r#"<div class="programa-button-container" data-id-materia="{}">{}</div>"#,
                        subject,
                        affordance.to_html()
                    )
                } else {
                    format!(
                        "{}\t{}\t{}",
                        subject,
                        affordance.caption(),
                        affordance.url().unwrap_or("-")
                    )
                }
            })
            .collect()
    }
}

impl SlotPage for TerminalPage {
    fn slots(&self) -> Vec<SlotBinding> {
        self.inner.slots()
    }

    fn find(&self, subject: &str) -> Option<SlotId> {
        self.inner.find(subject)
    }

    fn render(&self, slot: SlotId, affordance: Affordance) {
        self.show(slot, &affordance);
        self.inner.render(slot, affordance);
    }

    fn render_all(&self, slots: &[SlotId], affordance: &Affordance) {
        self.inner.render_all(slots, affordance);
        for slot in slots {
            self.show(*slot, affordance);
        }
    }
}
