pub mod ai;
pub mod analytics;
pub mod budget;
pub mod category;
pub mod expense;
pub mod health;

pub mod error {
    use expenses_common::token::TokenError;

    use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
    use actix_web::http::StatusCode;
    use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
    use serde::Serialize;
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    pub enum DoesNotExistType {
        Budget,
        Expense,
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(Cow<'static, str>),
        ConflictWithExisting(Cow<'static, str>),

        // 401
        BadToken(Cow<'static, str>),
        TokenExpired(Cow<'static, str>),
        TokenMissing(Cow<'static, str>),
        WrongTokenType(Cow<'static, str>),

        // 404
        DoesNotExist(Cow<'static, str>, DoesNotExistType),

        // 500
        InternalError(Cow<'static, str>),
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServerErrorResponse<'a> {
        pub message: &'a str,
        pub error_type: &'static str,
    }

    impl HttpErrorResponse {
        pub fn message(&self) -> &str {
            match self {
                HttpErrorResponse::IncorrectlyFormed(msg)
                | HttpErrorResponse::ConflictWithExisting(msg)
                | HttpErrorResponse::BadToken(msg)
                | HttpErrorResponse::TokenExpired(msg)
                | HttpErrorResponse::TokenMissing(msg)
                | HttpErrorResponse::WrongTokenType(msg)
                | HttpErrorResponse::DoesNotExist(msg, _)
                | HttpErrorResponse::InternalError(msg) => msg,
            }
        }

        pub fn error_type(&self) -> &'static str {
            match self {
                HttpErrorResponse::IncorrectlyFormed(_) => "IncorrectlyFormed",
                HttpErrorResponse::ConflictWithExisting(_) => "ConflictWithExisting",
                HttpErrorResponse::BadToken(_) => "BadToken",
                HttpErrorResponse::TokenExpired(_) => "TokenExpired",
                HttpErrorResponse::TokenMissing(_) => "TokenMissing",
                HttpErrorResponse::WrongTokenType(_) => "WrongTokenType",
                HttpErrorResponse::DoesNotExist(_, DoesNotExistType::Budget) => {
                    "BudgetDoesNotExist"
                }
                HttpErrorResponse::DoesNotExist(_, DoesNotExistType::Expense) => {
                    "ExpenseDoesNotExist"
                }
                HttpErrorResponse::InternalError(_) => "InternalError",
            }
        }
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}: {}", self.error_type(), self.message())
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ServerErrorResponse {
                message: self.message(),
                error_type: self.error_type(),
            })
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::ConflictWithExisting(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::BadToken(_)
                | HttpErrorResponse::TokenExpired(_)
                | HttpErrorResponse::TokenMissing(_)
                | HttpErrorResponse::WrongTokenType(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(err: TokenError) -> Self {
            match err {
                TokenError::TokenInvalid => {
                    HttpErrorResponse::BadToken(Cow::Borrowed("Token is invalid"))
                }
                TokenError::TokenExpired => {
                    HttpErrorResponse::TokenExpired(Cow::Borrowed("Token is expired"))
                }
                TokenError::TokenMissing => {
                    HttpErrorResponse::TokenMissing(Cow::Borrowed("Token is missing"))
                }
                TokenError::WrongTokenType => {
                    HttpErrorResponse::WrongTokenType(Cow::Borrowed("Incorrect token type"))
                }
            }
        }
    }

    pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
        HttpErrorResponse::IncorrectlyFormed(Cow::Owned(format!("Invalid JSON body: {err}")))
            .into()
    }

    pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
        HttpErrorResponse::IncorrectlyFormed(Cow::Owned(format!("Invalid path: {err}"))).into()
    }

    pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
        HttpErrorResponse::IncorrectlyFormed(Cow::Owned(format!("Invalid query: {err}"))).into()
    }

}

#[cfg(test)]
pub mod test_utils {
    use expenses_common::ai::clients::mock::MockGenerator;
    use expenses_common::ai::GenerateText;
    use expenses_common::db::memory::MemoryStore;
    use expenses_common::db::{BudgetStore, ExpenseStore};
    use expenses_common::token::auth_token::{AuthToken, AuthTokenType, NewAuthTokenClaims};

    use actix_http::Request;
    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::App;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use uuid::Uuid;

    use crate::env;

    pub struct TestState {
        pub store: Arc<MemoryStore>,
        pub generator: Arc<MockGenerator>,
    }

    impl TestState {
        pub fn new() -> Self {
            Self::with_generator(MockGenerator::failing())
        }

        pub fn with_generator(generator: MockGenerator) -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                generator: Arc::new(generator),
            }
        }

        pub async fn app(
            &self,
        ) -> impl Service<
            Request,
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
        > {
            let budget_store: Arc<dyn BudgetStore> = self.store.clone();
            let expense_store: Arc<dyn ExpenseStore> = self.store.clone();
            let generator: Arc<dyn GenerateText> = self.generator.clone();

            test::init_service(
                App::new()
                    .app_data(Data::from(budget_store))
                    .app_data(Data::from(expense_store))
                    .app_data(Data::from(generator))
                    .configure(crate::services::api::configure),
            )
            .await
        }
    }

    pub fn gen_access_token(user_id: Uuid) -> String {
        gen_token(user_id, AuthTokenType::Access, Duration::from_secs(60))
    }

    pub fn gen_token(user_id: Uuid, token_type: AuthTokenType, lifetime: Duration) -> String {
        let expiration = (SystemTime::now() + lifetime)
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let user_email = format!("test_user{}@test.com", user_id.simple());
        let claims = NewAuthTokenClaims {
            user_id,
            user_email: &user_email,
            expiration,
            token_type,
        };

        AuthToken::sign_new(&claims, &env::CONF.token_signing_key).unwrap()
    }

    pub fn authed(req: TestRequest, access_token: &str) -> TestRequest {
        req.insert_header(("Authorization", format!("Bearer {access_token}")))
    }

    pub async fn call_json<S, B>(app: &S, req: TestRequest) -> (u16, serde_json::Value)
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let resp = test::call_service(app, req.to_request()).await;
        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;

        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }
}
