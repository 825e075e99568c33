//! Developer-profile service: account registration and login with signed
//! tokens, and one profile per user with embedded experience and education.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod profile;
pub mod session;
pub mod state;
pub mod validation;
