use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::money;
use crate::schema::expenses;

#[derive(Clone, Debug, PartialEq, Eq, Identifiable, Queryable, Selectable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub amount_cents: i64,
    pub category: String,
    pub spent_at: DateTime<Utc>,
    pub receipt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn amount(&self) -> Decimal {
        money::from_cents(self.amount_cents)
    }

    pub fn apply(&mut self, changes: &ExpenseChanges) {
        if let Some(description) = &changes.description {
            self.description.clone_from(description);
        }

        if let Some(amount_cents) = changes.amount_cents {
            self.amount_cents = amount_cents;
        }

        if let Some(category) = &changes.category {
            self.category.clone_from(category);
        }

        if let Some(spent_at) = changes.spent_at {
            self.spent_at = spent_at;
        }

        if let Some(receipt) = &changes.receipt {
            self.receipt.clone_from(receipt);
        }

        self.updated_at = changes.updated_at;
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewExpense<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: &'a str,
    pub amount_cents: i64,
    pub category: &'a str,
    pub spent_at: DateTime<Utc>,
    pub receipt: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&NewExpense<'_>> for Expense {
    fn from(new_expense: &NewExpense<'_>) -> Self {
        Expense {
            id: new_expense.id,
            user_id: new_expense.user_id,
            description: String::from(new_expense.description),
            amount_cents: new_expense.amount_cents,
            category: String::from(new_expense.category),
            spent_at: new_expense.spent_at,
            receipt: new_expense.receipt.map(String::from),
            created_at: new_expense.created_at,
            updated_at: new_expense.updated_at,
        }
    }
}

/// `receipt: Some(None)` clears the receipt.
#[derive(Clone, Debug, Default, AsChangeset)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExpenseChanges {
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub category: Option<String>,
    pub spent_at: Option<DateTime<Utc>>,
    pub receipt: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}
