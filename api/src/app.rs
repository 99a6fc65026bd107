//! Application state and factory
//!
//! Builds the Actix-web application shared by `main` and the tests.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::InternalError,
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use tl_core::repositories::TokenRepository;
use tl_core::services::token::TokenService;
use tl_shared::{error_codes, ErrorResponse};

use crate::handlers::error_handler::bad_request;
use crate::routes::{health::health_check, refresh::refresh, tokens::issue_tokens};

/// Largest accepted JSON body in bytes
const JSON_BODY_LIMIT: usize = 4096;

/// Application state shared by all handlers
pub struct AppState<R: TokenRepository> {
    pub token_service: Arc<TokenService<R>>,
    /// Deadline applied to every engine call
    pub request_timeout: Duration,
}

impl<R: TokenRepository> AppState<R> {
    pub fn new(token_service: Arc<TokenService<R>>, request_timeout: Duration) -> Self {
        Self {
            token_service,
            request_timeout,
        }
    }
}

/// Create and configure the application
pub fn create_app<R>(
    app_state: web::Data<AppState<R>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: TokenRepository + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            let response = bad_request("Malformed request body");
            InternalError::from_response(err, response).into()
        });

    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request("Malformed query string");
        InternalError::from_response(err, response).into()
    });

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        .app_data(query_config)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .route("/tokens", web::get().to(issue_tokens::<R>))
        .route("/refresh", web::post().to(refresh::<R>))
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
