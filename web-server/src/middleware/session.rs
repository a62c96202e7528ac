//! Session middleware

use std::sync::Arc;

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::{COOKIE, SET_COOKIE},
    http::HeaderValue,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::{AppState, AppError};
use crate::sessions::Session;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "newscheck_session";

/// Session attached to the current request
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: Arc<Session>,
}

impl SessionContext {
    pub fn id(&self) -> Uuid {
        self.session.id
    }
}

/// Middleware: attach the visitor's session, starting one if needed
pub async fn attach_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie_id = extract_session_id(&req);

    let (session, created) = state.sessions.resolve(cookie_id);
    let session_id = session.id;

    req.extensions_mut().insert(SessionContext { session });

    let mut response = next.run(req).await;

    if created {
        let cookie = session_cookie(session_id, state.config.is_production());
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        response.headers_mut().append(SET_COOKIE, value);
    }

    Ok(response)
}

/// Middleware: attach the visitor's session if one is already live.
/// Requests without a live session pass through with nothing attached.
pub async fn find_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(session) = extract_session_id(&req).and_then(|id| state.sessions.find(id)) {
        req.extensions_mut().insert(SessionContext { session });
    }

    next.run(req).await
}

/// Read the session id from the Cookie header(s)
fn extract_session_id(req: &Request) -> Option<Uuid> {
    req.headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(id: Uuid, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE,
        id,
        if secure { "; Secure" } else { "" }
    )
}

/// Cookie that makes the browser forget the session
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| AppError::InternalError("session middleware not installed".to_string()))
    }
}
