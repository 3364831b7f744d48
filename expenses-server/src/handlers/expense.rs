use expenses_common::analytics::{self, MonthWindow};
use expenses_common::db::{DaoError, ExpenseStore};
use expenses_common::messages::{
    DeletedExpense, Expense, ExpenseUpdateRequest, NewExpenseRequest,
};
use expenses_common::models::expense::{ExpenseChanges, NewExpense};
use expenses_common::money;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use std::borrow::Cow;
use uuid::Uuid;

use crate::handlers::budget::validate_category;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::auth::{Access, VerifiedToken};
use crate::middleware::FromHeader;

const EXPENSE_NOT_FOUND_MSG: &str = "Expense not found";

pub async fn get_all(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let expenses = match expense_store
        .get_all_expenses(user_access_token.claims.user_id)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get expenses",
            )));
        }
    };

    let expenses: Vec<Expense> = expenses.iter().map(Expense::from).collect();
    Ok(HttpResponse::Ok().json(expenses))
}

pub async fn get(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    expense_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let expense = match expense_store
        .get_expense(*expense_id, user_access_token.claims.user_id)
        .await
    {
        Ok(e) => e,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(EXPENSE_NOT_FOUND_MSG),
                DoesNotExistType::Expense,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get expense",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(Expense::from(&expense)))
}

pub async fn create(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    new_expense: web::Json<NewExpenseRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let description = validate_description(new_expense.description.as_deref())?;

    let Some(amount) = new_expense.amount else {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Amount is required",
        )));
    };
    let amount_cents = validate_amount(amount)?;

    let category = match new_expense.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => validate_category(c)?,
        _ => {
            return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
                "Category is required",
            )))
        }
    };

    let Some(spent_at) = new_expense.date else {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Date is required",
        )));
    };

    let now = Utc::now();
    let new_expense = NewExpense {
        id: Uuid::now_v7(),
        user_id: user_access_token.claims.user_id,
        description,
        amount_cents,
        category: category.label(),
        spent_at,
        receipt: new_expense.receipt.as_deref(),
        created_at: now,
        updated_at: now,
    };

    let expense = match expense_store.create_expense(&new_expense).await {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to create expense",
            )));
        }
    };

    Ok(HttpResponse::Created().json(Expense::from(&expense)))
}

pub async fn update(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    expense_id: web::Path<Uuid>,
    expense_update: web::Json<ExpenseUpdateRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let description = match expense_update.description.as_deref() {
        Some(d) => Some(String::from(validate_description(Some(d))?)),
        None => None,
    };

    let category = match expense_update.category.as_deref() {
        Some(c) => Some(String::from(validate_category(c.trim())?.label())),
        None => None,
    };

    let changes = ExpenseChanges {
        description,
        amount_cents: expense_update.amount.map(validate_amount).transpose()?,
        category,
        spent_at: expense_update.date,
        receipt: expense_update.receipt.clone(),
        updated_at: Utc::now(),
    };

    let expense = match expense_store
        .update_expense(*expense_id, user_access_token.claims.user_id, &changes)
        .await
    {
        Ok(e) => e,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(EXPENSE_NOT_FOUND_MSG),
                DoesNotExistType::Expense,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to update expense",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(Expense::from(&expense)))
}

pub async fn delete(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    expense_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let expense_id = expense_id.into_inner();

    match expense_store
        .delete_expense(expense_id, user_access_token.claims.user_id)
        .await
    {
        Ok(_) => (),
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(EXPENSE_NOT_FOUND_MSG),
                DoesNotExistType::Expense,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to delete expense",
            )));
        }
    }

    Ok(HttpResponse::Ok().json(DeletedExpense {
        message: String::from("Expense removed"),
        id: expense_id,
    }))
}

pub async fn stats(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let expenses = match expense_store
        .get_all_expenses(user_access_token.claims.user_id)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get expense stats",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(analytics::spending::expense_stats(
        &expenses,
        &MonthWindow::current(),
    )))
}

fn validate_description(description: Option<&str>) -> Result<&str, HttpErrorResponse> {
    match description.map(str::trim) {
        Some(d) if !d.is_empty() => Ok(d),
        _ => Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Description is required",
        ))),
    }
}

fn validate_amount(amount: Decimal) -> Result<i64, HttpErrorResponse> {
    if amount <= Decimal::ZERO {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Amount must be greater than 0",
        )));
    }

    match money::to_cents(amount) {
        Some(c) if c > 0 => Ok(c),
        _ => Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Amount is out of range",
        ))),
    }
}
