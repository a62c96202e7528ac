//! Data models

pub mod check;
pub mod history;
pub mod status;

pub use check::*;
pub use history::*;
pub use status::*;
