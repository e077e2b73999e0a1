//! Reconcile Comprehensive Test Suite
//!
//! End-to-end tests of batched writes against the in-memory collection.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Index Correlation**
//!   Skipped actions, physical op positions and identifier backfill.
//!
//! - **Tier 2: Unmatched Writes**
//!   Fail and orphan policies for updates and deletes.
//!
//! - **Tier 3: Adapter**
//!   Single-document calls, configuration files and sessions.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test reconcile_comprehensive
//! ```

mod test_utils;


// Tier 2: Unmatched Writes
mod unmatched_writes;

// Tier 3: Adapter
mod adapter_end_to_end;
