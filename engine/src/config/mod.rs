//! Configuration

pub mod strip_config;

pub use strip_config::StripConfig;
