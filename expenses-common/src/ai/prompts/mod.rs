use chrono::{DateTime, Utc};

use crate::analytics::spending;
use crate::categories::Category;
use crate::models::expense::Expense;

/// Number of recent transactions listed in the chat prompt.
pub const CHAT_TRANSACTION_LINES: usize = 20;

pub fn categorize_prompt(description: &str) -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();

    format!(
        "Categorize this expense into ONE of these categories: {}.\n\
         Expense description: \"{description}\"\n\
         Respond with ONLY the category name, nothing else.",
        labels.join(", ")
    )
}

/// Spending figures summarized for the assistant.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatContext {
    pub total: f64,
    pub this_month_total: f64,
    pub this_month_count: usize,
    pub category_totals: Vec<(String, f64)>,
    pub recent_transactions: Vec<String>,
}

impl ChatContext {
    pub fn new(expenses_newest_first: &[Expense], now: &DateTime<Utc>) -> Self {
        let (this_month_total, this_month_count) = super::month_total(expenses_newest_first, now);

        let recent_transactions = expenses_newest_first
            .iter()
            .take(CHAT_TRANSACTION_LINES)
            .map(|e| {
                format!(
                    "{}: ${} - {} ({})",
                    e.spent_at.format("%-m/%-d/%Y"),
                    e.amount().normalize(),
                    e.description,
                    e.category
                )
            })
            .collect();

        Self {
            total: expenses_newest_first
                .iter()
                .map(|e| e.amount_cents as f64 / 100.0)
                .sum(),
            this_month_total,
            this_month_count,
            category_totals: spending::category_totals(expenses_newest_first),
            recent_transactions,
        }
    }

    /// Highest-spend category; the first one seen wins a tie.
    pub fn top_category(&self) -> Option<(&str, f64)> {
        self.category_totals
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (category, total)| match best {
                Some(b) if b.1 >= *total => Some(b),
                _ => Some((category.as_str(), *total)),
            })
    }
}

pub fn chat_prompt(context: &ChatContext, question: &str) -> String {
    let breakdown = context
        .category_totals
        .iter()
        .map(|(category, total)| format!("{category}: ${total:.2}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a helpful financial assistant. The user has the following expense data:\n\
         \n\
         Total expenses: ${:.2}\n\
         This month's expenses: ${:.2}\n\
         Categories breakdown: {breakdown}\n\
         \n\
         Recent transactions:\n\
         {}\n\
         \n\
         User's question: {question}\n\
         \n\
         Provide a helpful, friendly, and concise response. Use emojis where appropriate. \
         Keep your response under 200 words.",
        context.total,
        context.this_month_total,
        context.recent_transactions.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_categorize_prompt_lists_catalogue() {
        let prompt = categorize_prompt("Council levy");

        assert!(prompt.contains(
            "Food & Drinks, Travel, Shopping, Bills & Utilities, Entertainment, Personal, Other."
        ));
        assert!(prompt.contains("Expense description: \"Council levy\""));
    }

    #[test]
    fn test_chat_prompt_contents() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let expense = Expense {
            id: Uuid::now_v7(),
            user_id: Uuid::nil(),
            description: String::from("Train"),
            amount_cents: 4_250,
            category: String::from("Travel"),
            spent_at: now,
            receipt: None,
            created_at: now,
            updated_at: now,
        };

        let context = ChatContext::new(&[expense], &now);
        let prompt = chat_prompt(&context, "Am I on track?");

        assert!(prompt.contains("Total expenses: $42.50\n"));
        assert!(prompt.contains("This month's expenses: $42.50\n"));
        assert!(prompt.contains("Categories breakdown: Travel: $42.50\n"));
        assert!(prompt.contains("6/10/2025: $42.5 - Train (Travel)"));
        assert!(prompt.contains("User's question: Am I on track?"));
    }
}
