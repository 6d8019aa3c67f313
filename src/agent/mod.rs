pub mod backend;
pub mod pipeline;
pub mod prompts;
pub mod provider;
