pub mod bulk_resolver;
pub mod outcome;
pub mod render;

pub use bulk_resolver::BulkResolver;
pub use outcome::RunOutcome;
