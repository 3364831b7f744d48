use expenses_common::analytics::{self, MonthWindow};
use expenses_common::categories::Category;
use expenses_common::db::{BudgetStore, DaoError, ExpenseStore};
use expenses_common::messages::{
    Budget, BudgetStatusReport, BudgetUpdateRequest, Message, NewBudgetRequest,
};
use expenses_common::models::budget::{BudgetChanges, NewBudget, DEFAULT_ALERT_THRESHOLD};
use expenses_common::money;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use std::borrow::Cow;
use uuid::Uuid;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::auth::{Access, VerifiedToken};
use crate::middleware::FromHeader;

const BUDGET_NOT_FOUND_MSG: &str = "Budget not found";

pub async fn get(
    budget_store: web::Data<dyn BudgetStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = match budget_store
        .get_active_budgets(user_access_token.claims.user_id)
        .await
    {
        Ok(b) => b,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get budgets",
            )));
        }
    };

    let budgets: Vec<Budget> = budgets.iter().map(Budget::from).collect();
    Ok(HttpResponse::Ok().json(budgets))
}

pub async fn create(
    budget_store: web::Data<dyn BudgetStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    new_budget: web::Json<NewBudgetRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user_id = user_access_token.claims.user_id;

    let category = match new_budget.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => validate_category(c)?,
        _ => {
            return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
                "Category is required",
            )))
        }
    };

    let Some(monthly_limit) = new_budget.monthly_limit else {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Monthly limit is required",
        )));
    };
    let monthly_limit_cents = validate_monthly_limit(monthly_limit)?;

    let alert_threshold = match new_budget.alert_threshold {
        Some(t) => validate_alert_threshold(t)?,
        None => DEFAULT_ALERT_THRESHOLD,
    };

    match budget_store
        .get_budget_by_category(user_id, category.label())
        .await
    {
        Ok(None) => (),
        Ok(Some(_)) => return Err(duplicate_budget_error()),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to check for existing budget",
            )));
        }
    }

    let now = Utc::now();
    let new_budget = NewBudget {
        id: Uuid::now_v7(),
        user_id,
        category: category.label(),
        monthly_limit_cents,
        alert_threshold,
        is_active: true,
        notes: new_budget.notes.as_deref().unwrap_or(""),
        created_at: now,
        updated_at: now,
    };

    let budget = match budget_store.create_budget(&new_budget).await {
        Ok(b) => b,
        // Lost a race with a concurrent create for the same category
        Err(e) if e.is_unique_violation() => return Err(duplicate_budget_error()),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to create budget",
            )));
        }
    };

    Ok(HttpResponse::Created().json(Budget::from(&budget)))
}

pub async fn update(
    budget_store: web::Data<dyn BudgetStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    budget_id: web::Path<Uuid>,
    budget_update: web::Json<BudgetUpdateRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user_id = user_access_token.claims.user_id;

    // A missing or foreign budget is reported before any field is validated
    match budget_store.get_budget(*budget_id, user_id).await {
        Ok(_) => (),
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(BUDGET_NOT_FOUND_MSG),
                DoesNotExistType::Budget,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to update budget",
            )));
        }
    }

    let changes = BudgetChanges {
        monthly_limit_cents: budget_update
            .monthly_limit
            .map(validate_monthly_limit)
            .transpose()?,
        alert_threshold: budget_update
            .alert_threshold
            .map(validate_alert_threshold)
            .transpose()?,
        is_active: budget_update.is_active,
        notes: budget_update.notes.clone(),
        updated_at: Utc::now(),
    };

    let budget = match budget_store
        .update_budget(*budget_id, user_id, &changes)
        .await
    {
        Ok(b) => b,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(BUDGET_NOT_FOUND_MSG),
                DoesNotExistType::Budget,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to update budget",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(Budget::from(&budget)))
}

pub async fn delete(
    budget_store: web::Data<dyn BudgetStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    budget_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    match budget_store
        .delete_budget(*budget_id, user_access_token.claims.user_id)
        .await
    {
        Ok(_) => (),
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(BUDGET_NOT_FOUND_MSG),
                DoesNotExistType::Budget,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to delete budget",
            )));
        }
    }

    Ok(HttpResponse::Ok().json(Message::new("Budget deleted successfully")))
}

pub async fn status(
    budget_store: web::Data<dyn BudgetStore>,
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    const STATUS_FAILED_MSG: &str = "Failed to get budget status";

    let user_id = user_access_token.claims.user_id;

    let budgets = match budget_store.get_active_budgets(user_id).await {
        Ok(b) => b,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                STATUS_FAILED_MSG,
            )));
        }
    };

    if budgets.is_empty() {
        return Ok(HttpResponse::Ok().json(BudgetStatusReport::NoBudgets {
            message: String::from("No budgets set"),
            budget_status: Vec::new(),
        }));
    }

    let window = MonthWindow::current();
    let mut budget_status = Vec::with_capacity(budgets.len());

    for budget in budgets.iter() {
        let matched = match expense_store
            .get_category_expenses_in_range(user_id, &budget.category, window.start, window.end)
            .await
        {
            Ok(e) => e,
            Err(e) => {
                log::error!("{e}");
                return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                    STATUS_FAILED_MSG,
                )));
            }
        };

        budget_status.push(analytics::budget::budget_status(budget, &matched));
    }

    analytics::budget::sort_by_percentage(&mut budget_status);

    Ok(HttpResponse::Ok().json(BudgetStatusReport::Month {
        month: window.label,
        total_budgets: budgets.len(),
        budget_status,
    }))
}

pub async fn summary(
    budget_store: web::Data<dyn BudgetStore>,
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    const SUMMARY_FAILED_MSG: &str = "Failed to get budget summary";

    let user_id = user_access_token.claims.user_id;

    let budgets = match budget_store.get_active_budgets(user_id).await {
        Ok(b) => b,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                SUMMARY_FAILED_MSG,
            )));
        }
    };

    let window = MonthWindow::current();
    let month_expenses = match expense_store
        .get_expenses_in_range(user_id, window.start, window.end)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                SUMMARY_FAILED_MSG,
            )));
        }
    };

    Ok(HttpResponse::Ok().json(analytics::budget::budget_summary(
        &budgets,
        &month_expenses,
    )))
}

pub(crate) fn validate_category(category: &str) -> Result<Category, HttpErrorResponse> {
    category
        .parse::<Category>()
        .map_err(|e| HttpErrorResponse::IncorrectlyFormed(Cow::Owned(e.to_string())))
}

fn validate_monthly_limit(monthly_limit: Decimal) -> Result<i64, HttpErrorResponse> {
    if monthly_limit <= Decimal::ZERO {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Monthly limit must be greater than 0",
        )));
    }

    match money::to_cents(monthly_limit) {
        Some(c) if c > 0 => Ok(c),
        _ => Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Monthly limit is out of range",
        ))),
    }
}

fn validate_alert_threshold(alert_threshold: i64) -> Result<i16, HttpErrorResponse> {
    match i16::try_from(alert_threshold) {
        Ok(t) if (0..=100).contains(&t) => Ok(t),
        _ => Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Alert threshold must be between 0 and 100",
        ))),
    }
}

fn duplicate_budget_error() -> HttpErrorResponse {
    HttpErrorResponse::ConflictWithExisting(Cow::Borrowed(
        "Budget for this category already exists",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::test::TestRequest;
    use serde_json::json;

    use crate::handlers::test_utils::{authed, call_json, gen_access_token, TestState};

    #[actix_web::test]
    async fn test_create_and_list_budgets() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token).set_json(
            json!({"category": "Travel", "monthlyLimit": 100, "notes": "Trips"}),
        );
        let (status, created) = call_json(&app, req).await;

        assert_eq!(status, 201);
        assert_eq!(created["category"], "Travel");
        assert_eq!(created["monthlyLimit"], 100.0);
        assert_eq!(created["alertThreshold"], 80);
        assert_eq!(created["isActive"], true);
        assert_eq!(created["notes"], "Trips");

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token).set_json(
            json!({"category": "Food & Drinks", "monthlyLimit": 250.5, "alertThreshold": 0}),
        );
        let (status, created) = call_json(&app, req).await;

        assert_eq!(status, 201);
        assert_eq!(created["alertThreshold"], 0);

        let req = authed(TestRequest::get().uri("/api/budgets"), &access_token);
        let (status, budgets) = call_json(&app, req).await;

        assert_eq!(status, 200);
        let categories: Vec<&str> = budgets
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["category"].as_str().unwrap())
            .collect();
        assert_eq!(categories, vec!["Food & Drinks", "Travel"]);
    }

    #[actix_web::test]
    async fn test_create_budget_validation() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let bodies = [
            json!({"monthlyLimit": 100}),
            json!({"category": "  ", "monthlyLimit": 100}),
            json!({"category": "Travel"}),
            json!({"category": "Travel", "monthlyLimit": 0}),
            json!({"category": "Travel", "monthlyLimit": -5}),
            json!({"category": "Travel", "monthlyLimit": 100, "alertThreshold": 101}),
            json!({"category": "Groceries", "monthlyLimit": 100}),
        ];

        for body in bodies {
            let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
                .set_json(body.clone());
            let (status, resp) = call_json(&app, req).await;

            assert_eq!(status, 400, "{body}");
            assert_eq!(resp["errorType"], "IncorrectlyFormed");
        }

        let req = authed(TestRequest::get().uri("/api/budgets"), &access_token);
        let (_, budgets) = call_json(&app, req).await;
        assert_eq!(budgets, json!([]));
    }

    #[actix_web::test]
    async fn test_duplicate_budget_conflicts() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
            .set_json(json!({"category": "Shopping", "monthlyLimit": 300}));
        let (status, first) = call_json(&app, req).await;
        assert_eq!(status, 201);

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
            .set_json(json!({"category": "Shopping", "monthlyLimit": 50}));
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 400);
        assert_eq!(resp["errorType"], "ConflictWithExisting");
        assert_eq!(resp["message"], "Budget for this category already exists");

        let req = authed(TestRequest::get().uri("/api/budgets"), &access_token);
        let (_, budgets) = call_json(&app, req).await;

        assert_eq!(budgets.as_array().unwrap().len(), 1);
        assert_eq!(budgets[0]["id"], first["id"]);
        assert_eq!(budgets[0]["monthlyLimit"], 300.0);
    }

    #[actix_web::test]
    async fn test_update_budget() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
            .set_json(json!({"category": "Personal", "monthlyLimit": 80, "notes": "Gym"}));
        let (_, created) = call_json(&app, req).await;
        let id = created["id"].as_str().unwrap();

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &access_token,
        )
        .set_json(json!({"monthlyLimit": 120, "alertThreshold": 90}));
        let (status, updated) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(updated["monthlyLimit"], 120.0);
        assert_eq!(updated["alertThreshold"], 90);
        assert_eq!(updated["notes"], "Gym");
        assert_eq!(updated["isActive"], true);

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &access_token,
        )
        .set_json(json!({"monthlyLimit": 0, "notes": "Changed"}));
        let (status, _) = call_json(&app, req).await;
        assert_eq!(status, 400);

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &access_token,
        )
        .set_json(json!({"alertThreshold": -1}));
        let (status, _) = call_json(&app, req).await;
        assert_eq!(status, 400);

        let req = authed(TestRequest::get().uri("/api/budgets"), &access_token);
        let (_, budgets) = call_json(&app, req).await;

        assert_eq!(budgets[0]["monthlyLimit"], 120.0);
        assert_eq!(budgets[0]["alertThreshold"], 90);
        assert_eq!(budgets[0]["notes"], "Gym");

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &access_token,
        )
        .set_json(json!({"isActive": false}));
        let (status, updated) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(updated["isActive"], false);

        let req = authed(TestRequest::get().uri("/api/budgets"), &access_token);
        let (_, budgets) = call_json(&app, req).await;
        assert_eq!(budgets, json!([]));
    }

    #[actix_web::test]
    async fn test_budgets_are_scoped_to_owner() {
        let state = TestState::new();
        let app = state.app().await;
        let owner_token = gen_access_token(Uuid::now_v7());
        let other_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &owner_token)
            .set_json(json!({"category": "Entertainment", "monthlyLimit": 60}));
        let (_, created) = call_json(&app, req).await;
        let id = created["id"].as_str().unwrap();

        let req = authed(
            TestRequest::delete().uri(&format!("/api/budgets/{id}")),
            &other_token,
        );
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 404);
        assert_eq!(resp["errorType"], "BudgetDoesNotExist");

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &other_token,
        )
        .set_json(json!({"monthlyLimit": 1}));
        let (status, _) = call_json(&app, req).await;
        assert_eq!(status, 404);

        let req = authed(TestRequest::get().uri("/api/budgets"), &other_token);
        let (_, budgets) = call_json(&app, req).await;
        assert_eq!(budgets, json!([]));

        let req = authed(TestRequest::get().uri("/api/budgets"), &owner_token);
        let (_, budgets) = call_json(&app, req).await;
        assert_eq!(budgets[0]["monthlyLimit"], 60.0);

        let req = authed(
            TestRequest::delete().uri(&format!("/api/budgets/{id}")),
            &owner_token,
        );
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(resp["message"], "Budget deleted successfully");

        let req = authed(
            TestRequest::delete().uri(&format!("/api/budgets/{id}")),
            &owner_token,
        );
        let (status, _) = call_json(&app, req).await;
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_budget_routes_require_token() {
        let state = TestState::new();
        let app = state.app().await;

        let (status, resp) = call_json(&app, TestRequest::get().uri("/api/budgets")).await;
        assert_eq!(status, 401);
        assert_eq!(resp["errorType"], "TokenMissing");

        let req = TestRequest::get()
            .uri("/api/budgets/status")
            .insert_header(("Authorization", "Bearer not-a-token"));
        let (status, resp) = call_json(&app, req).await;
        assert_eq!(status, 401);
        assert_eq!(resp["errorType"], "BadToken");
    }

    #[actix_web::test]
    async fn test_malformed_budget_id() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::delete().uri("/api/budgets/1234"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 400);
        assert_eq!(resp["errorType"], "IncorrectlyFormed");
    }

    #[actix_web::test]
    async fn test_status_without_budgets() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::get().uri("/api/budgets/status"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(
            resp,
            json!({"message": "No budgets set", "budgetStatus": []})
        );
    }

    async fn add_expense<S, B>(app: &S, access_token: &str, amount: f64, category: &str)
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
        B: actix_web::body::MessageBody,
    {
        add_expense_at(app, access_token, amount, category, Utc::now()).await;
    }

    async fn add_expense_at<S, B>(
        app: &S,
        access_token: &str,
        amount: f64,
        category: &str,
        date: chrono::DateTime<Utc>,
    ) where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
        B: actix_web::body::MessageBody,
    {
        let req = authed(TestRequest::post().uri("/api/expenses"), access_token).set_json(json!({
            "description": "Test expense",
            "amount": amount,
            "category": category,
            "date": date,
        }));
        let (status, _) = call_json(app, req).await;
        assert_eq!(status, 201);
    }

    #[actix_web::test]
    async fn test_status_and_summary() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
            .set_json(json!({"category": "Travel", "monthlyLimit": 100}));
        let (_, travel) = call_json(&app, req).await;

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token).set_json(
            json!({"category": "Shopping", "monthlyLimit": 200, "alertThreshold": 50}),
        );
        call_json(&app, req).await;

        add_expense(&app, &access_token, 85.0, "Travel").await;
        add_expense(&app, &access_token, 90.0, "Shopping").await;
        add_expense(&app, &access_token, 25.0, "Personal").await;

        let req = authed(TestRequest::get().uri("/api/budgets/status"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(resp["month"], MonthWindow::current().label);
        assert_eq!(resp["totalBudgets"], 2);

        let travel_status = &resp["budgetStatus"][0];
        assert_eq!(travel_status["budgetId"], travel["id"]);
        assert_eq!(travel_status["category"], "Travel");
        assert_eq!(travel_status["spent"], 85.0);
        assert_eq!(travel_status["remaining"], 15.0);
        assert_eq!(travel_status["percentage"], 85.0);
        assert_eq!(travel_status["alertLevel"], "high");
        assert_eq!(travel_status["exceedsLimit"], false);
        assert_eq!(travel_status["transactionCount"], 1);

        let shopping_status = &resp["budgetStatus"][1];
        assert_eq!(shopping_status["category"], "Shopping");
        assert_eq!(shopping_status["percentage"], 45.0);
        assert_eq!(shopping_status["alertLevel"], "safe");

        add_expense(&app, &access_token, 35.0, "Travel").await;

        let req = authed(TestRequest::get().uri("/api/budgets/status"), &access_token);
        let (_, resp) = call_json(&app, req).await;

        let travel_status = &resp["budgetStatus"][0];
        assert_eq!(travel_status["spent"], 120.0);
        assert_eq!(travel_status["remaining"], 0.0);
        assert_eq!(travel_status["percentage"], 120.0);
        assert_eq!(travel_status["exceedsLimit"], true);
        assert_eq!(travel_status["alertLevel"], "high");
        assert_eq!(travel_status["transactionCount"], 2);

        let req = authed(TestRequest::get().uri("/api/budgets/summary"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(resp["totalBudget"], 300.0);
        assert_eq!(resp["totalSpent"], 235.0);
        assert_eq!(resp["totalRemaining"], 65.0);
        assert_eq!(resp["overallPercentage"], 78.3);
        assert_eq!(resp["budgetCount"], 2);
        assert_eq!(resp["isOverBudget"], false);
    }

    #[actix_web::test]
    async fn test_status_ignores_inactive_budgets_and_other_months() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
            .set_json(json!({"category": "Travel", "monthlyLimit": 100}));
        call_json(&app, req).await;

        let req = authed(TestRequest::post().uri("/api/budgets"), &access_token)
            .set_json(json!({"category": "Shopping", "monthlyLimit": 400}));
        let (_, shopping) = call_json(&app, req).await;
        let shopping_id = shopping["id"].as_str().unwrap();

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{shopping_id}")),
            &access_token,
        )
        .set_json(json!({"isActive": false}));
        let (status, _) = call_json(&app, req).await;
        assert_eq!(status, 200);

        let before_month = MonthWindow::current().start - chrono::Duration::days(1);

        add_expense(&app, &access_token, 40.0, "Travel").await;
        add_expense_at(&app, &access_token, 500.0, "Travel", before_month).await;
        add_expense(&app, &access_token, 10.0, "Shopping").await;
        add_expense_at(&app, &access_token, 70.0, "Shopping", before_month).await;

        let req = authed(TestRequest::get().uri("/api/budgets/status"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(resp["totalBudgets"], 1);

        let budget_status = resp["budgetStatus"].as_array().unwrap();
        assert_eq!(budget_status.len(), 1);
        assert_eq!(budget_status[0]["category"], "Travel");
        assert_eq!(budget_status[0]["spent"], 40.0);
        assert_eq!(budget_status[0]["transactionCount"], 1);
        assert_eq!(budget_status[0]["alertLevel"], "safe");

        let req = authed(TestRequest::get().uri("/api/budgets/summary"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(resp["totalBudget"], 100.0);
        assert_eq!(resp["totalSpent"], 50.0);
        assert_eq!(resp["totalRemaining"], 50.0);
        assert_eq!(resp["overallPercentage"], 50.0);
        assert_eq!(resp["budgetCount"], 1);
        assert_eq!(resp["isOverBudget"], false);
    }

    #[actix_web::test]
    async fn test_update_reports_missing_budget_before_validating() {
        let state = TestState::new();
        let app = state.app().await;
        let owner_token = gen_access_token(Uuid::now_v7());
        let other_token = gen_access_token(Uuid::now_v7());

        let req = authed(TestRequest::post().uri("/api/budgets"), &owner_token)
            .set_json(json!({"category": "Personal", "monthlyLimit": 80}));
        let (_, created) = call_json(&app, req).await;
        let id = created["id"].as_str().unwrap();

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &other_token,
        )
        .set_json(json!({"monthlyLimit": 0}));
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 404);
        assert_eq!(resp["errorType"], "BudgetDoesNotExist");

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{}", Uuid::now_v7())),
            &owner_token,
        )
        .set_json(json!({"alertThreshold": 150}));
        let (status, _) = call_json(&app, req).await;
        assert_eq!(status, 404);

        let req = authed(
            TestRequest::put().uri(&format!("/api/budgets/{id}")),
            &owner_token,
        )
        .set_json(json!({"monthlyLimit": 0}));
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 400);
        assert_eq!(resp["message"], "Monthly limit must be greater than 0");
    }

    #[actix_web::test]
    async fn test_summary_without_budgets() {
        let state = TestState::new();
        let app = state.app().await;
        let access_token = gen_access_token(Uuid::now_v7());

        add_expense(&app, &access_token, 10.0, "Other").await;

        let req = authed(TestRequest::get().uri("/api/budgets/summary"), &access_token);
        let (status, resp) = call_json(&app, req).await;

        assert_eq!(status, 200);
        assert_eq!(resp["totalBudget"], 0.0);
        assert_eq!(resp["totalSpent"], 10.0);
        assert_eq!(resp["totalRemaining"], 0.0);
        assert_eq!(resp["overallPercentage"], 0.0);
        assert_eq!(resp["budgetCount"], 0);
        assert_eq!(resp["isOverBudget"], true);
    }
}
