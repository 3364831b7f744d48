use expenses_common::token::auth_token::{AuthToken, AuthTokenClaims, AuthTokenType};
use expenses_common::token::TokenError;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future;
use std::marker::PhantomData;

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::{into_actix_error_res, TokenLocation};

pub trait RequestAuthTokenType {
    fn token_name() -> &'static str;
    fn token_type() -> AuthTokenType;
}

#[derive(Debug)]
pub struct Access {}

impl RequestAuthTokenType for Access {
    fn token_name() -> &'static str {
        "Authorization"
    }
    fn token_type() -> AuthTokenType {
        AuthTokenType::Access
    }
}

#[derive(Debug)]
pub struct VerifiedToken<T: RequestAuthTokenType, L: TokenLocation> {
    pub claims: AuthTokenClaims,
    _marker: PhantomData<(T, L)>,
}

impl<T, L> FromRequest for VerifiedToken<T, L>
where
    T: RequestAuthTokenType,
    L: TokenLocation,
{
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match into_actix_error_res(verify_token::<T, L>(req)) {
            Ok(claims) => future::ok(VerifiedToken {
                claims,
                _marker: PhantomData,
            }),
            Err(e) => future::err(e),
        }
    }
}

#[inline]
fn verify_token<T, L>(req: &HttpRequest) -> Result<AuthTokenClaims, TokenError>
where
    T: RequestAuthTokenType,
    L: TokenLocation,
{
    let token = match L::get_from_request(req, T::token_name()) {
        Some(t) => t,
        None => return Err(TokenError::TokenMissing),
    };

    AuthToken::verify_as(token, T::token_type(), &env::CONF.token_signing_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::ResponseError;
    use std::time::Duration;
    use uuid::Uuid;

    use crate::handlers::test_utils::{gen_access_token, gen_token};
    use crate::middleware::FromHeader;

    #[actix_web::test]
    async fn test_verified_from_header() {
        let user_id = Uuid::now_v7();
        let token = gen_access_token(user_id);

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_http_request();

        let verified = VerifiedToken::<Access, FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap();

        assert_eq!(verified.claims.user_id, user_id);
        assert_eq!(verified.claims.token_type, AuthTokenType::Access);
    }

    #[actix_web::test]
    async fn test_missing_token() {
        let req = TestRequest::default().to_http_request();

        let err = VerifiedToken::<Access, FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpErrorResponse::TokenMissing(_)));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_refresh_token_is_rejected() {
        let token = gen_token(
            Uuid::now_v7(),
            AuthTokenType::Refresh,
            Duration::from_secs(60),
        );

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_http_request();

        let err = VerifiedToken::<Access, FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpErrorResponse::WrongTokenType(_)));
    }

    #[actix_web::test]
    async fn test_expired_token_is_rejected() {
        let token = gen_token(Uuid::now_v7(), AuthTokenType::Access, Duration::ZERO);

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_http_request();

        let err = VerifiedToken::<Access, FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpErrorResponse::TokenExpired(_)));
    }

    #[actix_web::test]
    async fn test_tampered_token_is_rejected() {
        let mut token = gen_access_token(Uuid::now_v7());
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_http_request();

        let err = VerifiedToken::<Access, FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpErrorResponse::BadToken(_)));
    }
}
