use actix_web::{web, HttpRequest, HttpResponse};
use tokio::time::timeout;

use tl_core::repositories::TokenRepository;

use crate::app::AppState;
use crate::dto::{RefreshTokenRequest, TokenPairResponse};
use crate::handlers::error_handler::{handle_domain_error, timeout_response};

use super::client_origin;

/// Handler for POST /refresh
///
/// Exchanges a refresh secret for a new pair. The presented secret can
/// never be used again.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed body
/// - 401 Unauthorized: Unknown, expired or already used refresh token
///   (identical body in all three cases)
/// - 503 Service Unavailable: Token store unavailable or deadline exceeded
pub async fn refresh<R>(
    req: HttpRequest,
    state: web::Data<AppState<R>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
{
    let origin = client_origin(&req);

    match timeout(
        state.request_timeout,
        state.token_service.rotate(&request.refresh_token, &origin),
    )
    .await
    {
        Ok(Ok(pair)) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Ok(Err(error)) => handle_domain_error(error),
        Err(_) => timeout_response(),
    }
}
