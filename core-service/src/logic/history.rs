//! History Buffer - per-session log of past checks
//!
//! Append-only from the caller's point of view. Storage is capped; the
//! display window is always the most recent few entries, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HISTORY_CAPACITY, HISTORY_DISPLAY_WINDOW};
use super::model::PredictionResult;

/// One successful check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input_text: String,
    pub result: PredictionResult,
    pub checked_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(input_text: impl Into<String>, result: PredictionResult) -> Self {
        Self {
            input_text: input_text.into(),
            result,
            checked_at: Utc::now(),
        }
    }

    /// First `max_chars` characters followed by "..."
    pub fn preview(&self, max_chars: usize) -> String {
        let head: String = self.input_text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    total_appended: u64,
}

impl HistoryBuffer {
    /// Capacity below the display window is raised to it
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(HISTORY_DISPLAY_WINDOW),
            total_appended: 0,
        }
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        self.total_appended += 1;

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Up to `n` entries, most recent first
    pub fn recent(&self, n: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    /// The window the page shows
    pub fn display(&self) -> Vec<&HistoryEntry> {
        self.recent(HISTORY_DISPLAY_WINDOW)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries appended over the buffer's lifetime, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::Verdict;

    fn result(label: Verdict, p_real: f64) -> PredictionResult {
        let confidence = if label == Verdict::Real { p_real } else { 1.0 - p_real };
        PredictionResult {
            label,
            confidence,
            probabilities: [1.0 - p_real, p_real],
            inference_time_us: 10,
        }
    }

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry::new(text, result(Verdict::Real, 0.9))
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = HistoryBuffer::default();
        assert!(buffer.is_empty());
        assert!(buffer.recent(5).is_empty());
        assert_eq!(buffer.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_recent_is_reverse_insertion_order() {
        for k in 0..8 {
            let mut buffer = HistoryBuffer::default();
            for i in 0..k {
                buffer.append(entry(&format!("item {}", i)));
            }

            let recent = buffer.recent(5);
            assert_eq!(recent.len(), k.min(5));
            for (pos, e) in recent.iter().enumerate() {
                assert_eq!(e.input_text, format!("item {}", k - 1 - pos));
            }
        }
    }

    #[test]
    fn test_six_submissions_keep_first_stored() {
        let mut buffer = HistoryBuffer::default();
        for i in 1..=6 {
            buffer.append(entry(&format!("submission #{}", i)));
        }

        let shown: Vec<&str> = buffer.display().iter().map(|e| e.input_text.as_str()).collect();
        assert_eq!(
            shown,
            vec![
                "submission #6",
                "submission #5",
                "submission #4",
                "submission #3",
                "submission #2",
            ]
        );
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.recent(10).last().unwrap().input_text, "submission #1");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut buffer = HistoryBuffer::default();
        buffer.append(entry("same text"));
        buffer.append(entry("same text"));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut buffer = HistoryBuffer::new(10);
        for i in 0..25 {
            buffer.append(entry(&i.to_string()));
        }

        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.total_appended(), 25);
        assert_eq!(buffer.recent(1)[0].input_text, "24");
        assert_eq!(buffer.recent(10)[9].input_text, "15");
    }

    #[test]
    fn test_capacity_never_below_display_window() {
        let mut buffer = HistoryBuffer::new(1);
        for i in 0..7 {
            buffer.append(entry(&i.to_string()));
        }
        assert_eq!(buffer.display().len(), HISTORY_DISPLAY_WINDOW);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "é".repeat(60);
        let e = HistoryEntry::new(text, result(Verdict::Fake, 0.2));

        let preview = e.preview(50);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 53);

        let short = HistoryEntry::new("short", result(Verdict::Fake, 0.2));
        assert_eq!(short.preview(50), "short...");
    }
}
