pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod llm;
pub mod pipeline;
pub mod topology;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, GenerationError, PipelineError};
pub use pipeline::{PipelineBundle, PipelineInput, PipelineOrchestrator};
pub use workflow::launch;
