//! HTTP handlers

pub mod health;
pub mod page;
pub mod check;
pub mod history;
pub mod session;
pub mod status;
