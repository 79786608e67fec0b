//! DepEd assistant core: error taxonomy and configuration shared by every crate.

pub mod config;
pub mod error;

pub use config::{AssistantConfig, DataPaths, SearchSettings, DEFAULT_SUGGESTIONS};
pub use error::{Error, Result};
