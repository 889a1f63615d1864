//! Host collaborator contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define the deck/card store contracts the counters depend on.
//! - Isolate SQL details from counting and report orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`DeckNotFound`, `CardNotFound`)
//!   in addition to DB transport errors.

pub mod card_repo;
pub mod deck_repo;
