use super::affordance::Affordance;
use crate::types::types::SubjectRef;

/// Handle to one slot on a page. Only meaningful for the page that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// A slot together with the subject it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBinding {
    pub id: SlotId,
    pub subject: SubjectRef,
}

/// Trait for anything that hosts programa slots (a rendered page, a terminal,
/// an in-memory model).
///
/// The page owns its slots. The resolver only reads the bindings and replaces
/// slot content; it never adds or removes slots. A slot that disappeared
/// between `slots()` and `render()` must be ignored silently.
pub trait SlotPage: Send + Sync + 'static {
    /// Slots currently present, in document order.
    fn slots(&self) -> Vec<SlotBinding>;

    /// First slot currently bound to `subject`.
    fn find(&self, subject: &str) -> Option<SlotId>;

    /// Replace the content of one slot.
    fn render(&self, slot: SlotId, affordance: Affordance);

    /// Replace the content of several slots in one pass, with no other write
    /// interleaved. Pages with internal locking should override this.
    fn render_all(&self, slots: &[SlotId], affordance: &Affordance) {
        for slot in slots {
            self.render(*slot, affordance.clone());
        }
    }
}
