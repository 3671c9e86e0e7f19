//! Internal-traffic authentication strategy.
//!
//! The mode is explicit configuration resolved at startup (`AUTH_MODE`),
//! applied as one middleware layer. Whatever the mode, the resolved actor
//! identity lands in request extensions and becomes `performed_by` on
//! audit and transition records.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::AuthMode;
use crate::db::AppState;

/// Identity attached to every authenticated request.
#[derive(Clone, Debug)]
pub struct Actor(pub String);

const DEFAULT_ACTOR: &str = "internal";

pub async fn require_internal_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match state.config.auth_mode {
        AuthMode::Trust => Actor(DEFAULT_ACTOR.to_string()),
        AuthMode::SharedKey => {
            let provided = request
                .headers()
                .get("x-internal-key")
                .and_then(|v| v.to_str().ok());
            match (state.config.internal_api_key.as_deref(), provided) {
                (Some(expected), Some(given)) if given == expected => {
                    Actor(DEFAULT_ACTOR.to_string())
                }
                (None, _) => {
                    tracing::error!(
                        "AUTH_MODE=shared_key but INTERNAL_API_KEY is not set, rejecting"
                    );
                    return unauthorized("Internal API key is not configured");
                }
                _ => return unauthorized("Missing or invalid internal API key"),
            }
        }
        AuthMode::ForwardedContext => {
            match request
                .headers()
                .get("x-forwarded-user")
                .and_then(|v| v.to_str().ok())
            {
                Some(user) if !user.is_empty() => Actor(user.to_string()),
                _ => return unauthorized("Missing forwarded user context"),
            }
        }
    };

    request.extensions_mut().insert(actor);
    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "unauthorized", "message": message })),
    )
        .into_response()
}
