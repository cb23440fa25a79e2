//! HTTP route handlers.

pub mod catalog;
pub mod health;
pub mod teams;
