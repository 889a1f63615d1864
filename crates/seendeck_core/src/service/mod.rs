//! Counting and reporting use-case services.
//!
//! # Responsibility
//! - Orchestrate deck/card store calls into counters and the report pass.
//! - Keep host UI and storage details out of the report logic.

pub mod counter_service;
pub mod report_service;
