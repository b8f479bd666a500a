//! Metrics collection for observability
//!
//! Prometheus series for monitoring ledger traffic:
//!
//! - `ledger_transfers_total` - Successful transfers (incl. delegated)
//! - `ledger_mints_total` / `ledger_burns_total` - Supply movements
//! - `ledger_approvals_total` - Allowance sets and adjustments
//! - `ledger_rejections_total{reason}` - Failed operations by error kind
//! - `ledger_circulating_supply` - Current circulating supply
//!
//! Each collector owns its `Registry`; nothing is registered globally,
//! so multiple collectors can coexist in one process.

use prometheus::{Gauge, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Successful transfers
    pub transfers_total: IntCounter,

    /// Successful mints
    pub mints_total: IntCounter,

    /// Successful burns
    pub burns_total: IntCounter,

    /// Successful approvals and allowance adjustments
    pub approvals_total: IntCounter,

    /// Rejected operations, labelled by error kind
    pub rejections_total: IntCounterVec,

    /// Circulating supply
    pub circulating_supply: Gauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create a new collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transfers_total = IntCounter::new("ledger_transfers_total", "Successful transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let mints_total = IntCounter::new("ledger_mints_total", "Successful mints")?;
        registry.register(Box::new(mints_total.clone()))?;

        let burns_total = IntCounter::new("ledger_burns_total", "Successful burns")?;
        registry.register(Box::new(burns_total.clone()))?;

        let approvals_total = IntCounter::new(
            "ledger_approvals_total",
            "Successful approvals and allowance adjustments",
        )?;
        registry.register(Box::new(approvals_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("ledger_rejections_total", "Rejected operations"),
            &["reason"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let circulating_supply = Gauge::new("ledger_circulating_supply", "Circulating supply")?;
        registry.register(Box::new(circulating_supply.clone()))?;

        Ok(Self {
            transfers_total,
            mints_total,
            burns_total,
            approvals_total,
            rejections_total,
            circulating_supply,
            registry,
        })
    }

    /// Record a successful transfer
    pub fn record_transfer(&self) {
        self.transfers_total.inc();
    }

    /// Record a successful mint
    pub fn record_mint(&self) {
        self.mints_total.inc();
    }

    /// Record a successful burn
    pub fn record_burn(&self) {
        self.burns_total.inc();
    }

    /// Record a successful approval
    pub fn record_approval(&self) {
        self.approvals_total.inc();
    }

    /// Record a rejected operation by error kind
    pub fn record_rejection(&self, reason: &str) {
        self.rejections_total.with_label_values(&[reason]).inc();
    }

    /// Update the circulating-supply gauge
    pub fn update_supply(&self, supply: crate::types::Amount) {
        self.circulating_supply.set(supply as f64);
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.transfers_total.get(), 0);
        assert_eq!(metrics.mints_total.get(), 0);
    }

    #[test]
    fn test_collectors_are_independent() {
        // Two collectors in one process must not collide
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_transfer();
        assert_eq!(a.transfers_total.get(), 1);
        assert_eq!(b.transfers_total.get(), 0);
    }

    #[test]
    fn test_record_rejection_by_reason() {
        let metrics = Metrics::new().unwrap();
        metrics.record_rejection("insufficient_balance");
        metrics.record_rejection("insufficient_balance");
        metrics.record_rejection("unauthorized");
        assert_eq!(
            metrics
                .rejections_total
                .with_label_values(&["insufficient_balance"])
                .get(),
            2
        );
        assert_eq!(
            metrics
                .rejections_total
                .with_label_values(&["unauthorized"])
                .get(),
            1
        );
    }

    #[test]
    fn test_update_supply() {
        let metrics = Metrics::new().unwrap();
        metrics.update_supply(1_000_000);
        assert_eq!(metrics.circulating_supply.get(), 1_000_000.0);
    }
}
