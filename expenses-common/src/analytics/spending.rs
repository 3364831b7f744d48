use chrono::{DateTime, Months, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::analytics::window::MonthWindow;
use crate::messages::{
    Anomaly, ClientInsights, ClientInsightsRequest, ExpenseStats, Insight, InsightKind,
    MonthActivity, MonthlyTrend, PredictionConfidence, PredictionTrend, SpendingDirection,
    SpendingPrediction,
};
use crate::models::expense::Expense;
use crate::money;

pub const MIN_EXPENSES_FOR_ANOMALIES: usize = 5;
pub const MAX_REPORTED_ANOMALIES: usize = 5;
pub const PREDICTION_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

fn amount_f64(expense: &Expense) -> f64 {
    expense.amount_cents as f64 / 100.0
}

fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// `YYYY-MM` of a UTC instant.
pub fn month_key(moment: &DateTime<Utc>) -> String {
    moment.format("%Y-%m").to_string()
}

fn previous_month_key(now: &DateTime<Utc>) -> String {
    let previous = now.checked_sub_months(Months::new(1)).unwrap_or(*now);
    month_key(&previous)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean`.
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sums by key, keeping keys in the order they were first seen.
fn totals_in_first_seen_order<'a, I>(entries: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (String, &'a Expense)>,
{
    let mut totals: Vec<(String, f64)> = Vec::new();

    for (key, expense) in entries {
        match totals.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += amount_f64(expense),
            None => totals.push((key, amount_f64(expense))),
        }
    }

    totals
}

/// Monthly totals of expenses sorted oldest first, labelled like "Oct 2026" in `tz`.
pub fn spending_trends<Tz: TimeZone>(
    expenses_oldest_first: &[Expense],
    tz: &Tz,
) -> Vec<MonthlyTrend> {
    let mut trends: Vec<MonthlyTrend> = Vec::new();

    for expense in expenses_oldest_first {
        let month = expense
            .spent_at
            .with_timezone(tz)
            .naive_local()
            .format("%b %Y")
            .to_string();

        match trends.iter_mut().find(|t| t.month == month) {
            Some(trend) => {
                trend.total += expense.amount();
                trend.count += 1;
            }
            None => trends.push(MonthlyTrend {
                month,
                total: expense.amount(),
                count: 1,
            }),
        }
    }

    for trend in trends.iter_mut() {
        trend.total = money::round_money(trend.total);
    }

    trends
}

/// Expenses more than two standard deviations above the mean amount.
pub fn detect_anomalies(expenses: &[Expense]) -> Vec<Anomaly> {
    if expenses.len() < MIN_EXPENSES_FOR_ANOMALIES {
        return Vec::new();
    }

    let amounts: Vec<f64> = expenses.iter().map(amount_f64).collect();
    let mean = mean(&amounts);
    let threshold = mean + 2.0 * std_dev(&amounts, mean);

    expenses
        .iter()
        .filter(|e| amount_f64(e) > threshold)
        .take(MAX_REPORTED_ANOMALIES)
        .map(|e| Anomaly {
            expense: e.into(),
            deviation: money::round_percentage(decimal_from_f64(
                (amount_f64(e) - mean) / mean * 100.0,
            )),
            average_spending: money::round_money(decimal_from_f64(mean)),
        })
        .collect()
}

/// Next-month forecast from the expenses of the last few months, newest first.
pub fn predict_spending(
    expenses_newest_first: &[Expense],
    now: &DateTime<Utc>,
) -> SpendingPrediction {
    let current_key = month_key(now);
    let last_key = previous_month_key(now);

    let current_month = month_activity(expenses_newest_first, &current_key);
    let last_month = month_activity(expenses_newest_first, &last_key);
    let insights = rule_insights(expenses_newest_first, now);

    let totals: Vec<f64> = totals_in_first_seen_order(
        expenses_newest_first
            .iter()
            .map(|e| (month_key(&e.spent_at), e)),
    )
    .into_iter()
    .map(|(_, total)| total)
    .collect();

    if totals.is_empty() {
        return SpendingPrediction {
            predicted_amount: 0,
            confidence: PredictionConfidence::Low,
            trend: PredictionTrend::Stable,
            percent_change: 0,
            insights,
            current_month,
            last_month,
        };
    }

    let (recent, older) = totals.split_at(totals.len().min(2));
    let recent_avg = mean(recent);
    let older_avg = if older.is_empty() {
        recent_avg
    } else {
        mean(older)
    };

    let percent_change = if older_avg == 0.0 {
        0.0
    } else {
        (recent_avg - older_avg) / older_avg * 100.0
    };

    let trend = if percent_change > 10.0 {
        PredictionTrend::Up
    } else if percent_change < -10.0 {
        PredictionTrend::Down
    } else {
        PredictionTrend::Stable
    };

    let average = mean(&totals);
    let confidence = if average <= 0.0 {
        PredictionConfidence::Low
    } else {
        let variation = std_dev(&totals, average) / average;

        if variation < 0.2 {
            PredictionConfidence::High
        } else if variation > 0.5 {
            PredictionConfidence::Low
        } else {
            PredictionConfidence::Medium
        }
    };

    let predicted: f64 = totals
        .iter()
        .zip(PREDICTION_WEIGHTS)
        .map(|(total, weight)| total * weight)
        .sum();

    SpendingPrediction {
        predicted_amount: predicted.round() as i64,
        confidence,
        trend,
        percent_change: percent_change.round() as i64,
        insights,
        current_month,
        last_month,
    }
}

fn month_activity(expenses: &[Expense], key: &str) -> MonthActivity {
    let in_month: Vec<&Expense> = expenses
        .iter()
        .filter(|e| month_key(&e.spent_at) == key)
        .collect();

    MonthActivity {
        total: in_month.iter().map(|e| amount_f64(e)).sum::<f64>().round() as i64,
        transaction_count: in_month.len(),
    }
}

/// Heuristic observations over expenses sorted newest first.
pub fn rule_insights(expenses_newest_first: &[Expense], now: &DateTime<Utc>) -> Vec<Insight> {
    if expenses_newest_first.is_empty() {
        return vec![Insight {
            kind: InsightKind::Info,
            message: String::from("Start tracking expenses to get personalized insights"),
            action: String::from("Add your first expense to begin"),
        }];
    }

    let mut insights = Vec::new();

    let category_totals = totals_in_first_seen_order(
        expenses_newest_first
            .iter()
            .map(|e| (e.category.clone(), e)),
    );
    let grand_total: f64 = expenses_newest_first.iter().map(amount_f64).sum();

    let highest = category_totals
        .iter()
        .fold(None::<&(String, f64)>, |best, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        });

    if let Some((category, total)) = highest {
        let share = if grand_total > 0.0 {
            total / grand_total * 100.0
        } else {
            0.0
        };

        insights.push(Insight {
            kind: InsightKind::Warning,
            message: format!(
                "{category} is your highest spending category at {share:.1}% of total expenses"
            ),
            action: String::from("Consider setting a budget limit for this category"),
        });
    }

    let recent: Vec<f64> = expenses_newest_first.iter().take(30).map(amount_f64).collect();
    let recent_avg = mean(&recent);
    let high_count = recent.iter().filter(|a| **a > recent_avg * 2.0).count();

    if high_count > 0 {
        insights.push(Insight {
            kind: InsightKind::Alert,
            message: format!("{high_count} unusually high transaction(s) detected recently"),
            action: String::from("Review these transactions to ensure they align with your budget"),
        });
    }

    let current_total = month_total(expenses_newest_first, &month_key(now));
    let last_total = month_total(expenses_newest_first, &previous_month_key(now));

    if last_total > 0.0 {
        let change = (current_total - last_total) / last_total * 100.0;

        if change.abs() > 15.0 {
            let increased = change > 0.0;

            insights.push(Insight {
                kind: if increased {
                    InsightKind::Warning
                } else {
                    InsightKind::Success
                },
                message: format!(
                    "Your spending {} by {:.1}% compared to last month",
                    if increased { "increased" } else { "decreased" },
                    change.abs()
                ),
                action: String::from(if increased {
                    "Consider reviewing your budget limits"
                } else {
                    "Great job managing your expenses!"
                }),
            });
        }
    }

    insights
}

/// Total of the expenses whose UTC month is `key`.
pub fn month_total(expenses: &[Expense], key: &str) -> f64 {
    expenses
        .iter()
        .filter(|e| month_key(&e.spent_at) == key)
        .map(amount_f64)
        .sum()
}

/// Category totals in first-seen order.
pub fn category_totals(expenses: &[Expense]) -> Vec<(String, f64)> {
    totals_in_first_seen_order(expenses.iter().map(|e| (e.category.clone(), e)))
}

/// Insights over expenses supplied by the client rather than loaded from storage. Callers
/// reject an empty expense list before getting here. Returns `None` when the supplied amounts
/// overflow decimal arithmetic.
pub fn client_insights(request: &ClientInsightsRequest) -> Option<ClientInsights> {
    let count = request.expenses.len();
    let total_spent = checked_sum(request.expenses.iter().map(|e| e.amount))?;
    let average_per_transaction = if count == 0 {
        Decimal::ZERO
    } else {
        total_spent.checked_div(Decimal::from(count))?
    };

    let (top_category, top_total) = request
        .total_by_category
        .iter()
        .fold(None, |best: Option<(&str, Decimal)>, c| match best {
            Some(b) if b.1 >= c.total => Some(b),
            _ => Some((c.category.as_str(), c.total)),
        })
        .unwrap_or(("N/A", Decimal::ZERO));

    let mut amounts_by_date: Vec<_> =
        request.expenses.iter().map(|e| (e.date, e.amount)).collect();
    amounts_by_date.sort_by_key(|(date, _)| *date);

    let (first_half, second_half) = amounts_by_date.split_at(count / 2);
    let half_average = |half: &[(DateTime<Utc>, Decimal)]| -> Option<Option<Decimal>> {
        if half.is_empty() {
            return Some(None);
        }

        let sum = checked_sum(half.iter().map(|(_, a)| *a))?;
        Some(Some(sum.checked_div(Decimal::from(half.len()))?))
    };

    let second_avg = half_average(second_half)?.unwrap_or_default();
    let first_avg = half_average(first_half)?.unwrap_or(second_avg);

    let trend = if second_avg > first_avg {
        SpendingDirection::Increasing
    } else {
        SpendingDirection::Decreasing
    };
    let trend_percent = if first_avg.is_zero() {
        Decimal::ZERO
    } else {
        let change = second_avg
            .checked_sub(first_avg)?
            .checked_div(first_avg)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        money::round_percentage(change.abs())
    };

    let mut recommendations = Vec::new();

    if top_total > total_spent.checked_mul(Decimal::new(4, 1))? {
        let share = if total_spent.is_zero() {
            Decimal::ZERO
        } else {
            top_total
                .checked_div(total_spent)?
                .checked_mul(Decimal::ONE_HUNDRED)?
                .round()
        };
        recommendations.push(format!(
            "{top_category} represents {share}% of your spending. Consider setting a budget limit."
        ));
    }

    recommendations.push(String::from(match trend {
        SpendingDirection::Increasing => {
            "Your spending is trending upward. Review recent purchases and identify areas to cut back."
        }
        SpendingDirection::Decreasing => {
            "Great job! Your spending is trending downward. Keep up the good habits!"
        }
    }));

    if average_per_transaction > Decimal::ONE_HUNDRED {
        recommendations.push(String::from(
            "Your average transaction is quite high. Look for ways to reduce large purchases.",
        ));
    }

    let trend_word = match trend {
        SpendingDirection::Increasing => "increasing",
        SpendingDirection::Decreasing => "decreasing",
    };

    Some(ClientInsights {
        summary: format!(
            "You've spent ${:.2} across {count} transactions. Your spending is {trend_word} by {:.1}% compared to the previous period.",
            money::round_money(total_spent),
            trend_percent,
        ),
        top_spending_category: String::from(top_category),
        top_spending_amount: top_total,
        average_per_day: money::round_money(total_spent / Decimal::from(30)),
        average_per_transaction: money::round_money(average_per_transaction),
        trend,
        trend_percent,
        recommendations,
        savings_opportunity: money::round_money(top_total.checked_mul(Decimal::new(15, 2))?),
        total_spent: money::round_money(total_spent),
        total_transactions: count,
    })
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    amounts.try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// All-time and current-month totals with a per-category breakdown.
pub fn expense_stats(expenses: &[Expense], window: &MonthWindow) -> ExpenseStats {
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for expense in expenses {
        *by_category.entry(expense.category.clone()).or_default() += expense.amount();
    }

    let this_month: Decimal = expenses
        .iter()
        .filter(|e| window.contains(&e.spent_at))
        .map(Expense::amount)
        .sum();

    ExpenseStats {
        total: money::round_money(expenses.iter().map(Expense::amount).sum()),
        count: expenses.len(),
        this_month: money::round_money(this_month),
        by_category,
    }
}
