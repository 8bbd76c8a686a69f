//! backlog-core — Questionnaire model, scoring engine, and request service.
//!
//! This crate defines the questionnaire data model, the pure scoring
//! engine, the record types, and the collaborator traits that the rest of
//! the backlog estimator builds on.

pub mod error;
pub mod model;
pub mod parser;
pub mod questionnaire;
pub mod record;
pub mod scoring;
pub mod service;
pub mod traits;
