//! Aurum Token Core
//!
//! Balance-and-allowance ledger with checked arithmetic and transfer
//! gating: the accounting core a token host (sequencer, RPC surface,
//! indexer) builds on.
//!
//! # Architecture
//!
//! - **Composed aggregate**: `Ledger` owns the balances, allowances and
//!   supply counter, with `Authority`, `FreezeRegistry` and
//!   `TransferGate` embedded as fields and consulted as guards
//! - **Single writer**: every operation runs to completion before the
//!   next; the `actor` module is the async embedding of that model
//! - **Transactional**: operations validate before the first write, so
//!   a typed error means zero state change
//!
//! # Invariants
//!
//! - Conservation: Σ balances == circulating supply for all time
//! - Ceiling: circulating supply never exceeds the configured maximum
//! - Notifications: exactly once per successful mutation, in order,
//!   never on failure

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod access;
pub mod actor;
pub mod config;
pub mod error;
pub mod freeze;
pub mod gate;
pub mod ledger;
pub mod math;
pub mod metrics;
pub mod types;

// Re-exports
pub use access::Authority;
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use config::TokenConfig;
pub use error::{Error, Result};
pub use freeze::FreezeRegistry;
pub use gate::{GateOverride, GateStatus, TransferGate};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use types::{Address, Amount, Notification};
