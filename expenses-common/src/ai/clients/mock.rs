use async_trait::async_trait;
use std::sync::Mutex;

use crate::ai::{GenerateError, GenerateText};

/// Replays a fixed answer (or failure) and records every prompt it was given.
#[derive(Debug, Default)]
pub struct MockGenerator {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(String::from(answer)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(prompts) => prompts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl GenerateText for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        match self.prompts.lock() {
            Ok(mut prompts) => prompts.push(String::from(prompt)),
            Err(poisoned) => poisoned.into_inner().push(String::from(prompt)),
        }

        self.answer
            .clone()
            .ok_or_else(|| GenerateError::RequestFailed(String::from("mock failure")))
    }
}
