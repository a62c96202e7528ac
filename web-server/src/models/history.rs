//! History models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use newscheck_core::constants::HISTORY_PREVIEW_CHARS;
use newscheck_core::{HistoryBuffer, HistoryEntry, Verdict};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItemView {
    pub label: Verdict,
    pub confidence: f64,
    pub confidence_percent: String,
    pub preview: String,
    pub text: String,
    pub checked_at: DateTime<Utc>,
}

impl From<&HistoryEntry> for HistoryItemView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            label: entry.result.label,
            confidence: entry.result.confidence,
            confidence_percent: entry.result.confidence_percent(),
            preview: entry.preview(HISTORY_PREVIEW_CHARS),
            text: entry.input_text.clone(),
            checked_at: entry.checked_at,
        }
    }
}

/// Most recent checks, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    pub items: Vec<HistoryItemView>,
    pub stored: usize,
    pub total_checked: u64,
}

impl From<&HistoryBuffer> for HistoryView {
    fn from(buffer: &HistoryBuffer) -> Self {
        Self {
            items: buffer.display().into_iter().map(HistoryItemView::from).collect(),
            stored: buffer.len(),
            total_checked: buffer.total_appended(),
        }
    }
}
