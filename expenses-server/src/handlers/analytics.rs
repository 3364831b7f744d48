use expenses_common::analytics::spending;
use expenses_common::db::ExpenseStore;
use expenses_common::messages::{AnomalyList, ClientInsightsRequest};

use actix_web::{web, HttpResponse};
use chrono::Local;
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{Access, VerifiedToken};
use crate::middleware::FromHeader;

pub async fn trends(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let mut expenses = match expense_store
        .get_all_expenses(user_access_token.claims.user_id)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get spending trends",
            )));
        }
    };

    expenses.reverse();

    Ok(HttpResponse::Ok().json(spending::spending_trends(&expenses, &Local)))
}

pub async fn anomalies(
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
                "Failed to detect anomalies",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(AnomalyList {
        anomalies: spending::detect_anomalies(&expenses),
    }))
}

pub async fn insights(
    _user_access_token: VerifiedToken<Access, FromHeader>,
    request: web::Json<ClientInsightsRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if request.expenses.is_empty() {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "No expense data provided",
        )));
    }

    match spending::client_insights(&request) {
        Some(insights) => Ok(HttpResponse::Ok().json(insights)),
        None => Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Expense amounts are out of range",
        ))),
    }
}
