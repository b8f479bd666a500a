//! Per-account freeze flags gating transfer senders
//!
//! Flags are sticky booleans: freezing an already-frozen account (or
//! unfreezing an unfrozen one) is a rejected redundant toggle, never a
//! silent no-op. Unseen addresses read as not frozen.

use crate::error::{Error, Result};
use crate::types::Address;
use std::collections::HashSet;

/// Registry of frozen accounts
#[derive(Debug, Clone, Default)]
pub struct FreezeRegistry {
    frozen: HashSet<Address>,
}

impl FreezeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `account` is currently frozen
    pub fn is_frozen(&self, account: Address) -> bool {
        self.frozen.contains(&account)
    }

    /// Mark `account` frozen
    pub fn freeze(&mut self, account: Address) -> Result<()> {
        if !self.frozen.insert(account) {
            return Err(Error::AlreadyInState(format!(
                "account {} is already frozen",
                account
            )));
        }
        Ok(())
    }

    /// Clear the freeze flag on `account`
    pub fn unfreeze(&mut self, account: Address) -> Result<()> {
        if !self.frozen.remove(&account) {
            return Err(Error::AlreadyInState(format!(
                "account {} is not frozen",
                account
            )));
        }
        Ok(())
    }

    /// Number of frozen accounts
    pub fn frozen_count(&self) -> usize {
        self.frozen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        let mut bytes = [0u8; 32];
        bytes[31] = tag;
        Address::new(bytes)
    }

    #[test]
    fn test_default_is_unfrozen() {
        let registry = FreezeRegistry::new();
        assert!(!registry.is_frozen(addr(1)));
        assert_eq!(registry.frozen_count(), 0);
    }

    #[test]
    fn test_freeze_unfreeze_cycle() {
        let mut registry = FreezeRegistry::new();
        registry.freeze(addr(1)).unwrap();
        assert!(registry.is_frozen(addr(1)));
        assert!(!registry.is_frozen(addr(2)));

        registry.unfreeze(addr(1)).unwrap();
        assert!(!registry.is_frozen(addr(1)));
    }

    #[test]
    fn test_redundant_toggles_rejected() {
        let mut registry = FreezeRegistry::new();
        registry.freeze(addr(1)).unwrap();

        let err = registry.freeze(addr(1)).unwrap_err();
        assert!(matches!(err, Error::AlreadyInState(_)));
        assert!(registry.is_frozen(addr(1)));

        registry.unfreeze(addr(1)).unwrap();
        let err = registry.unfreeze(addr(1)).unwrap_err();
        assert!(matches!(err, Error::AlreadyInState(_)));
    }
}
