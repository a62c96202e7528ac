//! Session handlers

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
};

use crate::AppState;
use crate::middleware::session::{expired_session_cookie, SessionContext};

/// End the current session and drop its history
pub async fn end(
    State(state): State<AppState>,
    ctx: Option<SessionContext>,
) -> impl IntoResponse {
    if let Some(ctx) = ctx {
        state.sessions.end(ctx.id());
    }
    (StatusCode::NO_CONTENT, [(SET_COOKIE, expired_session_cookie())])
}
