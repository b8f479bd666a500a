//! Global time-based transfer gate
//!
//! The gate holds a single unlock threshold. Status is a pure function
//! of the observation time against that threshold, recomputed on every
//! transfer attempt rather than cached, so a call sequence straddling
//! the threshold observes the flip mid-sequence.
//!
//! The threshold-equality case (`now == unlock_at`) reads as unlocked.
//! Administrative `lock`/`unlock` overrides move the threshold to a
//! sentinel (far future / epoch); re-requesting the current sentinel
//! state is reported as `Unchanged`, which is an outcome, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gate status as observed at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateStatus {
    /// Transfers are rejected
    Locked,
    /// Transfers proceed
    Unlocked,
}

/// Outcome of an administrative override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOverride {
    /// The threshold moved to the requested sentinel
    Applied,
    /// The gate was already pinned at the requested sentinel
    Unchanged,
}

/// Time-threshold transfer gate
#[derive(Debug, Clone)]
pub struct TransferGate {
    unlock_at: DateTime<Utc>,
}

impl TransferGate {
    /// Sentinel threshold for a gate locked by override
    const LOCKED: DateTime<Utc> = DateTime::<Utc>::MAX_UTC;

    /// Sentinel threshold for a gate unlocked by override
    const UNLOCKED: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

    /// Create a gate that unlocks at `unlock_at`; `None` starts unlocked
    pub fn new(unlock_at: Option<DateTime<Utc>>) -> Self {
        Self {
            unlock_at: unlock_at.unwrap_or(Self::UNLOCKED),
        }
    }

    /// Current unlock threshold
    pub fn unlock_at(&self) -> DateTime<Utc> {
        self.unlock_at
    }

    /// Status as observed at `now`; the threshold instant itself is open
    pub fn status(&self, now: DateTime<Utc>) -> GateStatus {
        if now >= self.unlock_at {
            GateStatus::Unlocked
        } else {
            GateStatus::Locked
        }
    }

    /// Pin the gate shut
    pub fn lock(&mut self) -> GateOverride {
        if self.unlock_at == Self::LOCKED {
            return GateOverride::Unchanged;
        }
        self.unlock_at = Self::LOCKED;
        GateOverride::Applied
    }

    /// Pin the gate open
    pub fn unlock(&mut self) -> GateOverride {
        if self.unlock_at == Self::UNLOCKED {
            return GateOverride::Unchanged;
        }
        self.unlock_at = Self::UNLOCKED;
        GateOverride::Applied
    }
}
