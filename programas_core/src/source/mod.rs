pub mod http_source;
pub mod program_source;

pub use http_source::HttpProgramSource;
pub use program_source::ProgramSource;
