use expenses_common::ai::{self, GenerateText};
use expenses_common::analytics::spending;
use expenses_common::db::ExpenseStore;
use expenses_common::messages::{ChatRequest, ChatResponse, DescriptionRequest, InsightList};

use actix_web::{web, HttpResponse};
use chrono::{Months, Utc};
use std::borrow::Cow;

use crate::handlers::category::required_description;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{Access, VerifiedToken};
use crate::middleware::FromHeader;

const PREDICTION_LOOKBACK_MONTHS: u32 = 6;
const INSIGHTS_EXPENSE_LIMIT: i64 = 365;
const CHAT_EXPENSE_LIMIT: i64 = 100;

pub async fn predict(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let now = Utc::now();
    let since = now
        .checked_sub_months(Months::new(PREDICTION_LOOKBACK_MONTHS))
        .unwrap_or(now);

    let expenses = match expense_store
        .get_expenses_since(user_access_token.claims.user_id, since)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to predict spending",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(spending::predict_spending(&expenses, &now)))
}

pub async fn insights(
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let expenses = match expense_store
        .get_recent_expenses(user_access_token.claims.user_id, INSIGHTS_EXPENSE_LIMIT)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to generate insights",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(InsightList {
        insights: spending::rule_insights(&expenses, &Utc::now()),
    }))
}

pub async fn categorize(
    generator: web::Data<dyn GenerateText>,
    _user_access_token: VerifiedToken<Access, FromHeader>,
    request: web::Json<DescriptionRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let description = required_description(&request)?;
    let categorization = ai::categorize(generator.get_ref(), description).await;

    Ok(HttpResponse::Ok().json(categorization))
}

pub async fn chat(
    generator: web::Data<dyn GenerateText>,
    expense_store: web::Data<dyn ExpenseStore>,
    user_access_token: VerifiedToken<Access, FromHeader>,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let message = match request.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m,
        _ => {
            return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
                "Message is required",
            )))
        }
    };

    let expenses = match expense_store
        .get_recent_expenses(user_access_token.claims.user_id, CHAT_EXPENSE_LIMIT)
        .await
    {
        Ok(e) => e,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to process chat message",
            )));
        }
    };

    let response = ai::chat(generator.get_ref(), message, &expenses, &Utc::now()).await;

    Ok(HttpResponse::Ok().json(ChatResponse { response }))
}
