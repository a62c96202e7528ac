//! History handler

use axum::Json;

use newscheck_core::HistoryBuffer;

use crate::middleware::session::SessionContext;
use crate::models::HistoryView;

/// Recent checks for the current session (empty before the first check)
pub async fn recent(ctx: Option<SessionContext>) -> Json<HistoryView> {
    match ctx {
        Some(ctx) => Json(HistoryView::from(&*ctx.session.history.lock())),
        None => Json(HistoryView::from(&HistoryBuffer::default())),
    }
}
