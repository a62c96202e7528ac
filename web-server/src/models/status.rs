//! Status models

use serde::Serialize;

use newscheck_core::{EngineStats, LoaderStatus};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub artifacts: LoaderStatus,
    pub engine: EngineStats,
    pub active_sessions: usize,
    pub version: &'static str,
}
