//! Language-model access
//!
//! Everything that talks to the model goes through the [`LanguageModel`]
//! trait: a single request/response call, no streaming. The pipelines take
//! the trait object so tests can script responses deterministically.

mod ollama;
pub mod prompt;

pub use ollama::OllamaClient;

use crate::error::Result;
use async_trait::async_trait;

/// Single-call language-model interface.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted model for pipeline tests.

    use super::*;
    use crate::error::Error;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A model that replays scripted responses in order and records every
    /// prompt it was given.
    pub struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// All prompts seen so far, in call order.
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Model("script exhausted".to_string())))
        }
    }
}
