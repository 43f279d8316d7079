//! craftstory-llm
//!
//! Prompt construction, text generation backends, and recovery of the
//! structured story record from free-form model output.

pub mod bedrock;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod generator;
pub mod prompt;
pub mod story;
