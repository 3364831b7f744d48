use async_trait::async_trait;
use diesel::{dsl, BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::{BackendState, BudgetStore, DaoError, DbAsyncPool};
use crate::models::budget::{Budget, BudgetChanges, NewBudget};
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;

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
impl BudgetStore for Dao {
    async fn get_active_budgets(&self, user_id: Uuid) -> Result<Vec<Budget>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(budgets
            .filter(
                budget_fields::user_id
                    .eq(user_id)
                    .and(budget_fields::is_active.eq(true)),
            )
            .order(budget_fields::category.asc())
            .load::<Budget>(&mut conn)
            .await?)
    }

    async fn get_budget(&self, budget_id: Uuid, user_id: Uuid) -> Result<Budget, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(budgets
            .filter(
                budget_fields::id
                    .eq(budget_id)
                    .and(budget_fields::user_id.eq(user_id)),
            )
            .first::<Budget>(&mut conn)
            .await?)
    }

    async fn get_budget_by_category(
        &self,
        user_id: Uuid,
        category: &str,
    ) -> Result<Option<Budget>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(budgets
            .filter(
                budget_fields::user_id
                    .eq(user_id)
                    .and(budget_fields::category.eq(category)),
            )
            .first::<Budget>(&mut conn)
            .await
            .optional()?)
    }

    async fn create_budget(&self, new_budget: &NewBudget<'_>) -> Result<Budget, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(dsl::insert_into(budgets)
            .values(new_budget)
            .get_result::<Budget>(&mut conn)
            .await?)
    }

    async fn update_budget(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        changes: &BudgetChanges,
    ) -> Result<Budget, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(dsl::update(
            budgets.filter(
                budget_fields::id
                    .eq(budget_id)
                    .and(budget_fields::user_id.eq(user_id)),
            ),
        )
        .set(changes)
        .get_result::<Budget>(&mut conn)
        .await?)
    }

    async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        let deleted_count = diesel::delete(
            budgets.filter(
                budget_fields::id
                    .eq(budget_id)
                    .and(budget_fields::user_id.eq(user_id)),
            ),
        )
        .execute(&mut conn)
        .await?;

        if deleted_count == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }

    fn backend_state(&self) -> BackendState {
        let state = self.db_async_pool.state();

        BackendState {
            backend: "postgres",
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }
}
