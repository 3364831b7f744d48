use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{BackendState, BudgetStore, DaoError, ExpenseStore};
use crate::models::budget::{Budget, BudgetChanges, NewBudget};
use crate::models::expense::{Expense, ExpenseChanges, NewExpense};

/// Process-local store with the same contract as the Postgres DAOs, including the
/// (user, category) uniqueness of budgets. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    budgets: RwLock<Vec<Budget>>,
    expenses: RwLock<Vec<Expense>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found() -> DaoError {
    DaoError::QueryFailure(DieselError::NotFound)
}

fn newest_first(mut matched: Vec<Expense>) -> Vec<Expense> {
    matched.sort_by(|a, b| b.spent_at.cmp(&a.spent_at));
    matched
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn get_active_budgets(&self, user_id: Uuid) -> Result<Vec<Budget>, DaoError> {
        let budgets = self.budgets.read().await;

        let mut active: Vec<Budget> = budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.category.cmp(&b.category));

        Ok(active)
    }

    async fn get_budget(&self, budget_id: Uuid, user_id: Uuid) -> Result<Budget, DaoError> {
        self.budgets
            .read()
            .await
            .iter()
            .find(|b| b.id == budget_id && b.user_id == user_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_budget_by_category(
        &self,
        user_id: Uuid,
        category: &str,
    ) -> Result<Option<Budget>, DaoError> {
        Ok(self
            .budgets
            .read()
            .await
            .iter()
            .find(|b| b.user_id == user_id && b.category == category)
            .cloned())
    }

    async fn create_budget(&self, new_budget: &NewBudget<'_>) -> Result<Budget, DaoError> {
        let mut budgets = self.budgets.write().await;

        if budgets
            .iter()
            .any(|b| b.user_id == new_budget.user_id && b.category == new_budget.category)
        {
            return Err(DaoError::QueryFailure(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new(String::from(
                    "duplicate key value violates unique constraint \"budgets_user_id_category_idx\"",
                )),
            )));
        }

        let budget = Budget::from(new_budget);
        budgets.push(budget.clone());

        Ok(budget)
    }

    async fn update_budget(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        changes: &BudgetChanges,
    ) -> Result<Budget, DaoError> {
        let mut budgets = self.budgets.write().await;

        let budget = budgets
            .iter_mut()
            .find(|b| b.id == budget_id && b.user_id == user_id)
            .ok_or_else(not_found)?;
        budget.apply(changes);

        Ok(budget.clone())
    }

    async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> Result<(), DaoError> {
        let mut budgets = self.budgets.write().await;

        let position = budgets
            .iter()
            .position(|b| b.id == budget_id && b.user_id == user_id)
            .ok_or_else(not_found)?;
        budgets.remove(position);

        Ok(())
    }

    fn backend_state(&self) -> BackendState {
        BackendState {
            backend: "memory",
            connections: 0,
            idle_connections: 0,
        }
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn get_all_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, DaoError> {
        let expenses = self.expenses.read().await;

        Ok(newest_first(
            expenses
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_recent_expenses(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut recent = self.get_all_expenses(user_id).await?;
        recent.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));

        Ok(recent)
    }

    async fn get_expenses_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError> {
        let expenses = self.expenses.read().await;

        Ok(newest_first(
            expenses
                .iter()
                .filter(|e| e.user_id == user_id && e.spent_at >= since)
                .cloned()
                .collect(),
        ))
    }

    async fn get_expenses_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError> {
        let expenses = self.expenses.read().await;

        Ok(newest_first(
            expenses
                .iter()
                .filter(|e| e.user_id == user_id && e.spent_at >= from && e.spent_at <= to)
                .cloned()
                .collect(),
        ))
    }

    async fn get_category_expenses_in_range(
        &self,
        user_id: Uuid,
        category: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError> {
        let expenses = self.expenses.read().await;

        Ok(newest_first(
            expenses
                .iter()
                .filter(|e| {
                    e.user_id == user_id
                        && e.category == category
                        && e.spent_at >= from
                        && e.spent_at <= to
                })
                .cloned()
                .collect(),
        ))
    }

    async fn get_expense(&self, expense_id: Uuid, user_id: Uuid) -> Result<Expense, DaoError> {
        self.expenses
            .read()
            .await
            .iter()
            .find(|e| e.id == expense_id && e.user_id == user_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_expense(&self, new_expense: &NewExpense<'_>) -> Result<Expense, DaoError> {
        let expense = Expense::from(new_expense);
        self.expenses.write().await.push(expense.clone());

        Ok(expense)
    }

    async fn update_expense(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
        changes: &ExpenseChanges,
    ) -> Result<Expense, DaoError> {
        let mut expenses = self.expenses.write().await;

        let expense = expenses
            .iter_mut()
            .find(|e| e.id == expense_id && e.user_id == user_id)
            .ok_or_else(not_found)?;
        expense.apply(changes);

        Ok(expense.clone())
    }

    async fn delete_expense(&self, expense_id: Uuid, user_id: Uuid) -> Result<(), DaoError> {
        let mut expenses = self.expenses.write().await;

        let position = expenses
            .iter()
            .position(|e| e.id == expense_id && e.user_id == user_id)
            .ok_or_else(not_found)?;
        expenses.remove(position);

        Ok(())
    }
}
