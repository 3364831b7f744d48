//! JSON bodies exchanged with clients. Field names are camelCase on the wire and money is
//! carried as `Decimal`, serialized as a JSON number.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::categories::Category;
use crate::models::budget::Budget as BudgetModel;
use crate::models::expense::Expense as ExpenseModel;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub user: Uuid,
    pub category: String,
    pub monthly_limit: Decimal,
    pub alert_threshold: i16,
    pub is_active: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BudgetModel> for Budget {
    fn from(budget: &BudgetModel) -> Self {
        Budget {
            id: budget.id,
            user: budget.user_id,
            category: budget.category.clone(),
            monthly_limit: budget.monthly_limit(),
            alert_threshold: budget.alert_threshold,
            is_active: budget.is_active,
            notes: budget.notes.clone(),
            created_at: budget.created_at,
            updated_at: budget.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub user: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: DateTime<Utc>,
    pub receipt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ExpenseModel> for Expense {
    fn from(expense: &ExpenseModel) -> Self {
        Expense {
            id: expense.id,
            user: expense.user_id,
            description: expense.description.clone(),
            amount: expense.amount(),
            category: expense.category.clone(),
            date: expense.spent_at,
            receipt: expense.receipt.clone(),
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

// Required fields are optional here so that handlers can answer with a specific message
// instead of a generic deserialization failure.

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetRequest {
    pub category: Option<String>,
    pub monthly_limit: Option<Decimal>,
    pub alert_threshold: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdateRequest {
    pub monthly_limit: Option<Decimal>,
    pub alert_threshold: Option<i64>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub receipt: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdateRequest {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// Absent leaves the receipt alone, `null` removes it.
    #[serde(default, deserialize_with = "present_field")]
    pub receipt: Option<Option<String>>,
}

fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeletedExpense {
    pub message: String,
    pub id: Uuid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Safe,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage: Decimal,
    pub alert_level: AlertLevel,
    pub exceeds_limit: bool,
    pub transaction_count: usize,
    pub alert_threshold: i16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetStatusReport {
    #[serde(rename_all = "camelCase")]
    Month {
        month: String,
        total_budgets: usize,
        budget_status: Vec<BudgetStatus>,
    },
    #[serde(rename_all = "camelCase")]
    NoBudgets {
        message: String,
        budget_status: Vec<BudgetStatus>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub overall_percentage: Decimal,
    pub budget_count: usize,
    pub is_over_budget: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub total: Decimal,
    pub count: usize,
    pub this_month: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DescriptionRequest {
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySuggestion {
    pub category: Category,
    pub confidence: f64,
    pub matched_keyword: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub category: Category,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(flatten)]
    pub expense: Expense,
    pub deviation: Decimal,
    pub average_spending: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyList {
    pub anomalies: Vec<Anomaly>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientExpense {
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInsightsRequest {
    #[serde(default)]
    pub expenses: Vec<ClientExpense>,
    #[serde(default)]
    pub total_by_category: Vec<CategoryTotal>,
    pub time_range: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingDirection {
    Increasing,
    Decreasing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInsights {
    pub summary: String,
    pub top_spending_category: String,
    pub top_spending_amount: Decimal,
    pub average_per_day: Decimal,
    pub average_per_transaction: Decimal,
    pub trend: SpendingDirection,
    pub trend_percent: Decimal,
    pub recommendations: Vec<String>,
    pub savings_opportunity: Decimal,
    pub total_spent: Decimal,
    pub total_transactions: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Info,
    Warning,
    Alert,
    Success,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    pub action: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsightList {
    pub insights: Vec<Insight>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionConfidence {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionTrend {
    Up,
    Down,
    Stable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthActivity {
    pub total: i64,
    pub transaction_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPrediction {
    pub predicted_amount: i64,
    pub confidence: PredictionConfidence,
    pub trend: PredictionTrend,
    pub percent_change: i64,
    pub insights: Vec<Insight>,
    pub current_month: MonthActivity,
    pub last_month: MonthActivity,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    pub backend: String,
    pub connections: u32,
    pub idle_connections: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_update_distinguishes_null_receipt() {
        let absent: ExpenseUpdateRequest = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        assert_eq!(absent.receipt, None);
        assert_eq!(absent.amount, Some(Decimal::new(125, 1)));

        let cleared: ExpenseUpdateRequest =
            serde_json::from_str(r#"{"receipt": null}"#).unwrap();
        assert_eq!(cleared.receipt, Some(None));

        let replaced: ExpenseUpdateRequest =
            serde_json::from_str(r#"{"receipt": "r/1.png"}"#).unwrap();
        assert_eq!(replaced.receipt, Some(Some(String::from("r/1.png"))));
    }

    #[test]
    fn test_budget_status_report_shapes() {
        let empty = serde_json::to_value(BudgetStatusReport::NoBudgets {
            message: String::from("No budgets set"),
            budget_status: Vec::new(),
        })
        .unwrap();
        assert_eq!(
            empty,
            serde_json::json!({"message": "No budgets set", "budgetStatus": []})
        );

        let month = serde_json::to_value(BudgetStatusReport::Month {
            month: String::from("March 2025"),
            total_budgets: 0,
            budget_status: Vec::new(),
        })
        .unwrap();
        assert_eq!(
            month,
            serde_json::json!({"month": "March 2025", "totalBudgets": 0, "budgetStatus": []})
        );
    }

    #[test]
    fn test_money_serializes_as_number() {
        let summary = BudgetSummary {
            total_budget: Decimal::new(10000, 2),
            total_spent: Decimal::new(8500, 2),
            total_remaining: Decimal::new(1500, 2),
            overall_percentage: Decimal::new(850, 1),
            budget_count: 1,
            is_over_budget: false,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["totalBudget"], serde_json::json!(100.0));
        assert_eq!(value["overallPercentage"], serde_json::json!(85.0));
        assert_eq!(value["isOverBudget"], serde_json::json!(false));
    }

    #[test]
    fn test_insight_kind_is_serialized_as_type() {
        let insight = Insight {
            kind: InsightKind::Warning,
            message: String::from("m"),
            action: String::from("a"),
        };

        assert_eq!(
            serde_json::to_value(&insight).unwrap(),
            serde_json::json!({"type": "warning", "message": "m", "action": "a"})
        );
    }
}
