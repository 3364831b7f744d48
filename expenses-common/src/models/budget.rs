use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::money;
use crate::schema::budgets;

pub const DEFAULT_ALERT_THRESHOLD: i16 = 80;

#[derive(Clone, Debug, PartialEq, Eq, Identifiable, Queryable, Selectable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub monthly_limit_cents: i64,
    pub alert_threshold: i16,
    pub is_active: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn monthly_limit(&self) -> Decimal {
        money::from_cents(self.monthly_limit_cents)
    }

    /// Applies the fields present in `changes`, leaving the rest untouched.
    pub fn apply(&mut self, changes: &BudgetChanges) {
        if let Some(monthly_limit_cents) = changes.monthly_limit_cents {
            self.monthly_limit_cents = monthly_limit_cents;
        }

        if let Some(alert_threshold) = changes.alert_threshold {
            self.alert_threshold = alert_threshold;
        }

        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }

        if let Some(notes) = &changes.notes {
            self.notes.clone_from(notes);
        }

        self.updated_at = changes.updated_at;
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBudget<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: &'a str,
    pub monthly_limit_cents: i64,
    pub alert_threshold: i16,
    pub is_active: bool,
    pub notes: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&NewBudget<'_>> for Budget {
    fn from(new_budget: &NewBudget<'_>) -> Self {
        Budget {
            id: new_budget.id,
            user_id: new_budget.user_id,
            category: String::from(new_budget.category),
            monthly_limit_cents: new_budget.monthly_limit_cents,
            alert_threshold: new_budget.alert_threshold,
            is_active: new_budget.is_active,
            notes: String::from(new_budget.notes),
            created_at: new_budget.created_at,
            updated_at: new_budget.updated_at,
        }
    }
}

/// Partial update. `None` fields are skipped by diesel and by `Budget::apply`.
#[derive(Clone, Debug, Default, AsChangeset)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BudgetChanges {
    pub monthly_limit_cents: Option<i64>,
    pub alert_threshold: Option<i16>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}
