//! Answer generation over retrieved context

pub mod prompt;
pub mod qa;

pub use prompt::PromptBuilder;
pub use qa::RetrievalQa;
