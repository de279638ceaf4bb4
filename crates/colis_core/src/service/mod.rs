//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validator and repository calls into use-case level APIs.
//! - Keep CLI/FFI layers decoupled from storage details.

pub mod auth_service;
pub mod record_service;
