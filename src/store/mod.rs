//! Tiered counter storage.
//!
//! # Data Flow
//! ```text
//! counter operation (incr / get / set / delete)
//!     → tiered.rs (bounded attempt against the durable backend)
//!         → resp.rs (RESP2 over TCP, pooled connections)
//!     → on any error or timeout: local.rs (in-process map)
//! ```
//!
//! # Design Decisions
//! - Backend capability is probed once at construction; probe failure selects
//!   the in-process tier and never surfaces as an error
//! - Every call re-attempts the durable backend; a failed call falls back for
//!   that call only
//! - The in-process tier locks per key, so concurrent tasks never lose updates
//! - Callers never see storage errors

pub mod backend;
pub mod local;
pub mod resp;
pub mod tiered;
pub mod types;

pub use backend::CounterBackend;
pub use local::LocalStore;
pub use resp::RespBackend;
pub use tiered::TieredCounterStore;
pub use types::{BackendKind, StoreError, StoreResult};
