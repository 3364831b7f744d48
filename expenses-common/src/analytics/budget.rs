use rust_decimal::Decimal;

use crate::messages::{AlertLevel, BudgetStatus, BudgetSummary};
use crate::models::budget::Budget;
use crate::models::expense::Expense;
use crate::money;

/// Percentage at which a budget below its own alert threshold is flagged "medium".
pub const MEDIUM_ALERT_PERCENTAGE: i16 = 70;

/// Alert tier for an unrounded spend percentage.
pub fn alert_level(percentage: Decimal, alert_threshold: i16) -> AlertLevel {
    if percentage >= Decimal::from(alert_threshold) {
        AlertLevel::High
    } else if percentage >= Decimal::from(MEDIUM_ALERT_PERCENTAGE) {
        AlertLevel::Medium
    } else {
        AlertLevel::Safe
    }
}

/// Status of one budget given the expenses already matched to it for the month.
pub fn budget_status(budget: &Budget, matched_expenses: &[Expense]) -> BudgetStatus {
    let limit = budget.monthly_limit();
    let spent: Decimal = matched_expenses.iter().map(Expense::amount).sum();
    let raw_percentage = money::ratio_percentage(spent, limit);

    BudgetStatus {
        budget_id: budget.id,
        category: budget.category.clone(),
        limit,
        spent: money::round_money(spent),
        remaining: money::round_money((limit - spent).max(Decimal::ZERO)),
        percentage: money::round_percentage(raw_percentage),
        alert_level: alert_level(raw_percentage, budget.alert_threshold),
        exceeds_limit: spent > limit,
        transaction_count: matched_expenses.len(),
        alert_threshold: budget.alert_threshold,
    }
}

/// Orders statuses by their reported (rounded) percentage, highest first.
pub fn sort_by_percentage(statuses: &mut [BudgetStatus]) {
    statuses.sort_by(|a, b| b.percentage.cmp(&a.percentage));
}

/// Portfolio totals. `month_expenses` is every expense of the user in the window,
/// regardless of category.
pub fn budget_summary(active_budgets: &[Budget], month_expenses: &[Expense]) -> BudgetSummary {
    let total_budget: Decimal = active_budgets.iter().map(Budget::monthly_limit).sum();
    let total_spent: Decimal = month_expenses.iter().map(Expense::amount).sum();

    BudgetSummary {
        total_budget: money::round_money(total_budget),
        total_spent: money::round_money(total_spent),
        total_remaining: money::round_money((total_budget - total_spent).max(Decimal::ZERO)),
        overall_percentage: money::percentage_of(total_spent, total_budget),
        budget_count: active_budgets.len(),
        is_over_budget: total_spent > total_budget,
    }
}
