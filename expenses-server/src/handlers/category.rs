use expenses_common::categories;
use expenses_common::messages::DescriptionRequest;

use actix_web::{web, HttpResponse};
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{Access, VerifiedToken};
use crate::middleware::FromHeader;

pub(crate) fn required_description(
    request: &DescriptionRequest,
) -> Result<&str, HttpErrorResponse> {
    match request.description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => Ok(d),
        _ => Err(HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed(
            "Description is required",
        ))),
    }
}

pub async fn suggest(
    _user_access_token: VerifiedToken<Access, FromHeader>,
    request: web::Json<DescriptionRequest>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let description = required_description(&request)?;
    Ok(HttpResponse::Ok().json(categories::suggest(description)))
}
