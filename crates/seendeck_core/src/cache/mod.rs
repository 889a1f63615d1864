//! Memoized per-deck counters.
//!
//! # Invariants
//! - Cached values live in a side table owned by this crate; host deck
//!   records are never annotated.
//! - A slot is trusted only when stamped at or after the pass reference time.

pub mod counter_cache;
