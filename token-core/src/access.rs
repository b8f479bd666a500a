//! Authority seat: the single identity permitted to mint and administer
//! gating
//!
//! The seat is either `Held` by one address or `Vacant`. Once vacated it
//! may be claimed by anyone: the first claim after vacancy wins, with
//! ties resolved by the ledger's total call ordering.

use crate::error::{Error, Result};
use crate::types::Address;

/// The authority seat
#[derive(Debug, Clone)]
pub struct Authority {
    holder: Option<Address>,
}

impl Authority {
    /// Create a seat held by `initial`
    pub fn new(initial: Address) -> Self {
        Self {
            holder: Some(initial),
        }
    }

    /// Current holder, `None` when vacant
    pub fn holder(&self) -> Option<Address> {
        self.holder
    }

    /// Guard: `Unauthorized` unless `caller` holds the seat
    pub fn ensure(&self, caller: Address) -> Result<()> {
        if self.holder == Some(caller) {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }

    /// Hand the seat to `new`; returns the previous holder
    pub fn transfer(&mut self, caller: Address, new: Address) -> Result<Address> {
        self.ensure(caller)?;
        if new.is_zero() {
            return Err(Error::ZeroAddress);
        }
        // ensure() proved holder == Some(caller)
        self.holder = Some(new);
        Ok(caller)
    }

    /// Vacate the seat; returns the previous holder
    pub fn renounce(&mut self, caller: Address) -> Result<Address> {
        let holder = self.holder.ok_or(Error::AuthorityVacant)?;
        if holder != caller {
            return Err(Error::Unauthorized);
        }
        self.holder = None;
        Ok(holder)
    }

    /// Claim a vacant seat; first caller after vacancy wins
    pub fn claim(&mut self, caller: Address) -> Result<()> {
        if caller.is_zero() {
            return Err(Error::ZeroAddress);
        }
        if self.holder.is_some() {
            return Err(Error::AuthorityNotVacant);
        }
        self.holder = Some(caller);
        Ok(())
    }
}
