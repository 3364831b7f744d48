use async_trait::async_trait;

use crate::ai::{GenerateError, GenerateText};

/// Stand-in used when no model API key is configured. Callers fall back to their rule-based
/// answers.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl GenerateText for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Disabled)
    }
}
