//! Middleware

pub mod session;
