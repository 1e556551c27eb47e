pub mod affordance;
pub mod memory_page;
pub mod page;

// Convenient re-exports
pub use affordance::{Affordance, ManualReason};
pub use memory_page::MemoryPage;
pub use page::{SlotBinding, SlotId, SlotPage};
