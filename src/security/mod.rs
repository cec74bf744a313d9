//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Login attempt:
//!     → brute_force.rs check (locked? reject with 429)
//!     → caller verifies credentials
//!     → failure: record_failure / success: clear
//! ```
//!
//! # Design Decisions
//! - Fail closed: a locked identifier is rejected before credentials are read
//! - Lockout state lives in the shared counter store, so every replica agrees

pub mod brute_force;

pub use brute_force::{
    redact_identifier, AccountLocked, BruteForceGuard, LockoutStatus, ACCOUNT_LOCKED,
};
