//! HTTP handlers for all web routes.

pub mod dashboard;
pub mod profiles;
pub mod chat;
pub mod system;
pub mod assets;
