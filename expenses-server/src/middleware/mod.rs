pub mod auth;

use expenses_common::token::TokenError;

use actix_web::HttpRequest;

use crate::handlers::error::HttpErrorResponse;

pub trait TokenLocation {
    fn get_from_request<'a>(req: &'a HttpRequest, key: &str) -> Option<&'a str>;
}

/// Reads `<key>: Bearer <token>` from the request headers.
#[derive(Debug)]
pub struct FromHeader {}

impl TokenLocation for FromHeader {
    fn get_from_request<'a>(req: &'a HttpRequest, key: &str) -> Option<&'a str> {
        const BEARER_PREFIX: &str = "Bearer ";

        let header = req.headers().get(key)?.to_str().ok()?;

        let token = header.strip_prefix(BEARER_PREFIX)?.trim();
        if token.is_empty() {
            return None;
        }

        Some(token)
    }
}

#[inline(always)]
fn into_actix_error_res<T>(result: Result<T, TokenError>) -> Result<T, HttpErrorResponse> {
    result.map_err(HttpErrorResponse::from)
}
