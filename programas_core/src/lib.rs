pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod resolver;
pub mod slot;
pub mod source;
pub mod types;
