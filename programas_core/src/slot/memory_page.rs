use std::sync::{Mutex, MutexGuard};

use super::affordance::Affordance;
use super::page::{SlotBinding, SlotId, SlotPage};
use crate::types::types::SubjectRef;

struct MemorySlot {
    subject: SubjectRef,
    affordance: Affordance,
    /// Number of writes this slot has received.
    renders: usize,
    removed: bool,
}

/// In-memory page: an ordered list of slots, each starting on `Fetch`.
///
/// Slot ids are positions in the original list and stay valid after a slot
/// is removed; writes to a removed slot are dropped.
pub struct MemoryPage {
    slots: Mutex<Vec<MemorySlot>>,
}

impl MemoryPage {
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectRef>,
    {
        let slots = subjects
            .into_iter()
            .map(|s| MemorySlot {
                subject: s.into(),
                affordance: Affordance::Fetch,
                renders: 0,
                removed: false,
            })
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MemorySlot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn affordance(&self, slot: SlotId) -> Option<Affordance> {
        self.lock()
            .get(slot.0)
            .filter(|s| !s.removed)
            .map(|s| s.affordance.clone())
    }

    /// Affordance of the first live slot bound to `subject`.
    pub fn affordance_of(&self, subject: &str) -> Option<Affordance> {
        self.find(subject).and_then(|id| self.affordance(id))
    }

    pub fn subject(&self, slot: SlotId) -> Option<SubjectRef> {
        self.lock().get(slot.0).map(|s| s.subject.clone())
    }

    pub fn render_count(&self, slot: SlotId) -> usize {
        self.lock().get(slot.0).map(|s| s.renders).unwrap_or(0)
    }

    /// `(subject, affordance)` for every live slot, in document order.
    pub fn snapshot(&self) -> Vec<(SubjectRef, Affordance)> {
        self.lock()
            .iter()
            .filter(|s| !s.removed)
            .map(|s| (s.subject.clone(), s.affordance.clone()))
            .collect()
    }

    /// Take every slot bound to `subject` off the page.
    pub fn remove(&self, subject: &str) {
        for slot in self.lock().iter_mut().filter(|s| s.subject == subject) {
            slot.removed = true;
        }
    }
}

impl SlotPage for MemoryPage {
    fn slots(&self) -> Vec<SlotBinding> {
        self.lock()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.removed)
            .map(|(i, s)| SlotBinding {
                id: SlotId(i),
                subject: s.subject.clone(),
            })
            .collect()
    }

    fn find(&self, subject: &str) -> Option<SlotId> {
        self.lock()
            .iter()
            .position(|s| !s.removed && s.subject == subject)
            .map(SlotId)
    }

    fn render(&self, slot: SlotId, affordance: Affordance) {
        if let Some(s) = self.lock().get_mut(slot.0).filter(|s| !s.removed) {
            s.affordance = affordance;
            s.renders += 1;
        }
    }

    fn render_all(&self, slots: &[SlotId], affordance: &Affordance) {
        let mut guard = self.lock();
        for id in slots {
            if let Some(s) = guard.get_mut(id.0).filter(|s| !s.removed) {
                s.affordance = affordance.clone();
                s.renders += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_returns_first_live_duplicate() {
        let page = MemoryPage::new(["10", "20", "10"]);
        assert_eq!(page.find("10"), Some(SlotId(0)));
        assert_eq!(page.slots().len(), 3);

        page.remove("20");
        assert_eq!(page.find("20"), None);
        assert_eq!(
            page.slots().iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![SlotId(0), SlotId(2)]
        );
    }

    #[test]
    fn writes_to_removed_slot_are_dropped() {
        let page = MemoryPage::new(["10"]);
        page.remove("10");
        page.render(SlotId(0), Affordance::Loading);
        assert_eq!(page.render_count(SlotId(0)), 0);
        assert_eq!(page.affordance(SlotId(0)), None);
    }
}
