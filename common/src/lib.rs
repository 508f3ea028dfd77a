pub mod config;
pub mod games;
pub mod identifiers;
pub mod logger;

pub use identifiers::*;
pub use logger::LogLevel;
