use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{dsl, BoolExpressionMethods, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::{DaoError, DbAsyncPool, ExpenseStore};
use crate::models::expense::{Expense, ExpenseChanges, NewExpense};
use crate::schema::expenses as expense_fields;
use crate::schema::expenses::dsl::expenses;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }
}

#[async_trait]
impl ExpenseStore for Dao {
    async fn get_all_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(expenses
            .filter(expense_fields::user_id.eq(user_id))
            .order(expense_fields::spent_at.desc())
            .load::<Expense>(&mut conn)
            .await?)
    }

    async fn get_recent_expenses(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(expenses
            .filter(expense_fields::user_id.eq(user_id))
            .order(expense_fields::spent_at.desc())
            .limit(limit)
            .load::<Expense>(&mut conn)
            .await?)
    }

    async fn get_expenses_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(expenses
            .filter(
                expense_fields::user_id
                    .eq(user_id)
                    .and(expense_fields::spent_at.ge(since)),
            )
            .order(expense_fields::spent_at.desc())
            .load::<Expense>(&mut conn)
            .await?)
    }

    async fn get_expenses_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(expenses
            .filter(
                expense_fields::user_id
                    .eq(user_id)
                    .and(expense_fields::spent_at.between(from, to)),
            )
            .order(expense_fields::spent_at.desc())
            .load::<Expense>(&mut conn)
            .await?)
    }

    async fn get_category_expenses_in_range(
        &self,
        user_id: Uuid,
        category: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(expenses
            .filter(
                expense_fields::user_id
                    .eq(user_id)
                    .and(expense_fields::category.eq(category))
                    .and(expense_fields::spent_at.between(from, to)),
            )
            .order(expense_fields::spent_at.desc())
            .load::<Expense>(&mut conn)
            .await?)
    }

    async fn get_expense(&self, expense_id: Uuid, user_id: Uuid) -> Result<Expense, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(expenses
            .filter(
                expense_fields::id
                    .eq(expense_id)
                    .and(expense_fields::user_id.eq(user_id)),
            )
            .first::<Expense>(&mut conn)
            .await?)
    }

    async fn create_expense(&self, new_expense: &NewExpense<'_>) -> Result<Expense, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(dsl::insert_into(expenses)
            .values(new_expense)
            .get_result::<Expense>(&mut conn)
            .await?)
    }

    async fn update_expense(
        &self,
        expense_id: Uuid,
        user_id: Uuid,
        changes: &ExpenseChanges,
    ) -> Result<Expense, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(dsl::update(
            expenses.filter(
                expense_fields::id
                    .eq(expense_id)
                    .and(expense_fields::user_id.eq(user_id)),
            ),
        )
        .set(changes)
        .get_result::<Expense>(&mut conn)
        .await?)
    }

    async fn delete_expense(&self, expense_id: Uuid, user_id: Uuid) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        let deleted_count = diesel::delete(
            expenses.filter(
                expense_fields::id
                    .eq(expense_id)
                    .and(expense_fields::user_id.eq(user_id)),
            ),
        )
        .execute(&mut conn)
        .await?;

        if deleted_count == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }
}
