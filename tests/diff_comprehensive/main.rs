//! Diff Comprehensive Test Suite
//!
//! Tests for the structural diff and update compiler guarantees.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Diff Invariants**
//!   Record shape for objects, arrays and the root.
//!
//! - **Tier 2: Compiled Updates**
//!   The `$set` / `$unset` wire form for known transitions.
//!
//! - **Tier 3: Property-Based**
//!   Random document pairs: no-op idempotence, apply round-trip,
//!   non-overlapping paths.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test diff_comprehensive
//!
//! # Property-based tests only
//! cargo test --test diff_comprehensive prop_
//! ```


// Tier 1: Diff Invariants
mod diff_invariants;

// Tier 2: Compiled Updates
mod compiled_updates;

// Tier 3: Property-Based
mod property_tests;
