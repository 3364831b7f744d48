use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel_async::pooled_connection::bb8::Pool as AsyncPool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use std::fmt;
use uuid::Uuid;

use crate::models::budget::{Budget, BudgetChanges, NewBudget};
use crate::models::expense::{Expense, ExpenseChanges, NewExpense};

pub mod budget;
pub mod expense;
pub mod memory;

pub type DbAsyncPool = AsyncPool<AsyncPgConnection>;

pub async fn create_db_async_pool(database_uri: &str, max_db_connections: u32) -> DbAsyncPool {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_uri);
    AsyncPool::builder()
        .max_size(max_db_connections)
        .build(config)
        .await
        .expect("Failed to create async DB pool")
}

#[derive(Debug)]
pub enum DaoError {
    DbAsyncPoolFailure(String),
    QueryFailure(diesel::result::Error),
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbAsyncPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain async DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
        }
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<bb8::RunError<E>> for DaoError {
    fn from(error: bb8::RunError<E>) -> Self {
        DaoError::DbAsyncPoolFailure(error.to_string())
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}

impl DaoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::QueryFailure(diesel::result::Error::NotFound))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DaoError::QueryFailure(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))
        )
    }
}

/// Snapshot reported by the health check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendState {
    pub backend: &'static str,
    pub connections: u32,
    pub idle_connections: u32,
}

/// Budget persistence. Every lookup is scoped to the owning user; a budget owned by
/// someone else is indistinguishable from a missing one.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Active budgets of the user, ordered by category ascending.
    async fn get_active_budgets(&self, user_id: Uuid) -> Result<Vec<Budget>, DaoError>;

    async fn get_budget(&self, budget_id: Uuid, user_id: Uuid) -> Result<Budget, DaoError>;

    async fn get_budget_by_category(
        &self,
        user_id: Uuid,
        category: &str,
    ) -> Result<Option<Budget>, DaoError>;

    async fn create_budget(&self, new_budget: &NewBudget<'_>) -> Result<Budget, DaoError>;

    async fn update_budget(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        changes: &BudgetChanges,
    ) -> Result<Budget, DaoError>;

    async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> Result<(), DaoError>;

    fn backend_state(&self) -> BackendState;
}

/// Expense persistence. Range bounds are inclusive on both ends.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// All expenses of the user, newest first.
    async fn get_all_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, DaoError>;

    async fn get_recent_expenses(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Expense>, DaoError>;

    async fn get_expenses_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError>;

    async fn get_expenses_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError>;

    async fn get_category_expenses_in_range(
        &self,
        user_id: Uuid,
        category: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError>;

    async fn get_expense(&self, expense_id: Uuid, user_id: Uuid) -> Result<Expense, DaoError>;

    async fn create_expense(&self, new_expense: &NewExpense<'_>) -> Result<Expense, DaoError>;

    async fn update_expense(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
        changes: &ExpenseChanges,
    ) -> Result<Expense, DaoError>;

    async fn delete_expense(&self, expense_id: Uuid, user_id: Uuid) -> Result<(), DaoError>;
}
