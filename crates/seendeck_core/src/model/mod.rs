//! Read models for host-owned collection records.
//!
//! # Invariants
//! - Deck hierarchy is encoded only by `::`-separated names.
//! - Records here are snapshots; this crate never writes host-owned fields
//!   as a side effect of counting.

pub mod card;
pub mod deck;
