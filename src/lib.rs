pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod llm;
pub mod memory;
pub mod research;

// Re-export commonly used types
pub use config::Config;
pub use error::PipelineError;
pub use generator::state::{PipelineRequest, PipelineState};
pub use generator::workflow::{PipelineOrchestrator, launch};
