//! Logic Module - Business Logic & Engines
//!
//! - `model/` - artifact loading and inference (TF-IDF, linear/NB/voting classifiers)
//! - `history` - per-session log of past checks
//! - `check` - the submit flow tying them together

pub mod model;
pub mod history;
pub mod check;
