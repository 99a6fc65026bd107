use actix_web::{web, HttpRequest, HttpResponse};
use tokio::time::timeout;
use tracing::warn;
use validator::Validate;

use tl_core::errors::{DomainError, ValidationError};
use tl_core::repositories::TokenRepository;

use crate::app::AppState;
use crate::dto::{IssueTokensQuery, TokenPairResponse};
use crate::handlers::error_handler::{handle_domain_error, timeout_response};

use super::client_origin;

/// Handler for GET /tokens?user_id=<uuid>
///
/// Issues a fresh access/refresh pair for the subject.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "q8Z...",
///     "token_type": "Bearer",
///     "access_expires_in": 900,
///     "refresh_expires_in": 86400
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `user_id` missing or not a UUID
/// - 503 Service Unavailable: Token store unavailable or deadline exceeded
/// - 500 Internal Server Error: Signing or hashing failure
pub async fn issue_tokens<R>(
    req: HttpRequest,
    state: web::Data<AppState<R>>,
    query: web::Query<IssueTokensQuery>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
{
    let query = query.into_inner();
    if let Err(errors) = query.validate() {
        warn!(errors = %errors, "Rejected token request");
        return handle_domain_error(
            ValidationError::InvalidFormat {
                field: "user_id".to_string(),
            }
            .into(),
        );
    }

    let Some(user_id) = query.user_id else {
        return handle_domain_error(DomainError::from(ValidationError::RequiredField {
            field: "user_id".to_string(),
        }));
    };

    let origin = client_origin(&req);

    match timeout(
        state.request_timeout,
        state.token_service.issue_pair(&user_id, &origin),
    )
    .await
    {
        Ok(Ok(pair)) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Ok(Err(error)) => handle_domain_error(error),
        Err(_) => timeout_response(),
    }
}
