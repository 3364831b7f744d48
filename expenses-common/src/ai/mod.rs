pub mod clients;
pub mod prompts;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::fmt;

use crate::analytics::spending;
use crate::categories::{self, Category, FALLBACK_CONFIDENCE};
use crate::messages::Categorization;
use crate::models::expense::Expense;

pub const KEYWORD_CONFIDENCE: f64 = 0.9;
pub const MODEL_CONFIDENCE: f64 = 0.85;

#[derive(Debug)]
pub enum GenerateError {
    Disabled,
    ClientSetup(String),
    RequestFailed(String),
    BadStatus(u16),
    EmptyResponse,
}

impl std::error::Error for GenerateError {}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Disabled => write!(f, "GenerateError: Text generation is disabled"),
            GenerateError::ClientSetup(e) => {
                write!(f, "GenerateError: Failed to set up HTTP client: {e}")
            }
            GenerateError::RequestFailed(e) => write!(f, "GenerateError: Request failed: {e}"),
            GenerateError::BadStatus(status) => {
                write!(f, "GenerateError: Model API responded with status {status}")
            }
            GenerateError::EmptyResponse => {
                write!(f, "GenerateError: Model API returned no text")
            }
        }
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(error: reqwest::Error) -> Self {
        GenerateError::RequestFailed(error.to_string())
    }
}

#[async_trait]
pub trait GenerateText: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Keyword match first, then the model, then `Other`. A model answer that is not a known
/// category label is treated like a failed call.
pub async fn categorize(generator: &dyn GenerateText, description: &str) -> Categorization {
    if let Some((category, _)) = categories::match_keyword(description) {
        return Categorization {
            category,
            confidence: KEYWORD_CONFIDENCE,
        };
    }

    match generator
        .generate(&prompts::categorize_prompt(description))
        .await
    {
        Ok(answer) => {
            let label = answer.trim().trim_matches(|c: char| c == '"' || c == '.').trim();

            match label.parse::<Category>() {
                Ok(category) => {
                    return Categorization {
                        category,
                        confidence: MODEL_CONFIDENCE,
                    }
                }
                Err(e) => log::warn!("Model suggested an unusable category: {e}"),
            }
        }
        Err(GenerateError::Disabled) => (),
        Err(e) => log::error!("{e}"),
    }

    Categorization {
        category: Category::Other,
        confidence: FALLBACK_CONFIDENCE,
    }
}

/// Answers a question about the user's spending. `expenses_newest_first` is the context the
/// model sees; when the model is unavailable a fixed set of rule-based answers is used.
pub async fn chat(
    generator: &dyn GenerateText,
    message: &str,
    expenses_newest_first: &[Expense],
    now: &DateTime<Utc>,
) -> String {
    let context = prompts::ChatContext::new(expenses_newest_first, now);

    match generator
        .generate(&prompts::chat_prompt(&context, message))
        .await
    {
        Ok(answer) => return answer,
        Err(GenerateError::Disabled) => (),
        Err(e) => log::error!("{e}"),
    }

    rule_based_answer(&context, message, now)
}

fn mentions_in_order(text: &str, first: &str, then: &str) -> bool {
    text.find(first)
        .is_some_and(|i| text[i + first.len()..].contains(then))
}

fn rule_based_answer(context: &prompts::ChatContext, message: &str, now: &DateTime<Utc>) -> String {
    let message = message.to_lowercase();

    let asks_month_spend = mentions_in_order(&message, "spend", "month")
        || mentions_in_order(&message, "spent", "month")
        || mentions_in_order(&message, "month", "spend")
        || mentions_in_order(&message, "how much", "month");

    if asks_month_spend {
        return format!(
            "💰 This month you've spent ${:.2} across {} transactions.",
            context.this_month_total, context.this_month_count
        );
    }

    if ["average", "daily", "per day"]
        .iter()
        .any(|w| message.contains(w))
    {
        let days = now.day();
        return format!(
            "📊 Your average daily spending this month is ${:.2} (based on {days} days).",
            context.this_month_total / f64::from(days)
        );
    }

    if ["category", "categories", "biggest", "highest", "most"]
        .iter()
        .any(|w| message.contains(w))
        || mentions_in_order(&message, "where", "spend")
    {
        return match context.top_category() {
            Some((category, total)) => format!(
                "📊 Your top spending category is \"{category}\" with ${total:.2} spent."
            ),
            None => String::from("📊 You haven't recorded any expenses yet."),
        };
    }

    String::from(
        "👋 I'm your AI Financial Assistant! Try asking:\n\n\
         💰 \"How much did I spend this month?\"\n\
         📊 \"What's my biggest category?\"\n\
         📈 \"What's my average daily spending?\"\n\
         💡 \"Any budget tips?\"",
    )
}

pub(crate) fn month_total(expenses: &[Expense], now: &DateTime<Utc>) -> (f64, usize) {
    let key = spending::month_key(now);
    let count = expenses
        .iter()
        .filter(|e| spending::month_key(&e.spent_at) == key)
        .count();

    (spending::month_total(expenses, &key), count)
}
