//! Main ledger aggregate
//!
//! Holds the balances and allowances maps, the circulating-supply
//! counter, and the composed authority/freeze/gate components. Every
//! public mutation is transactional: all preconditions are validated
//! (and all derived values computed) before the first write, so a typed
//! error always means zero state change.
//!
//! # Invariants
//!
//! - Conservation: Σ balances == circulating supply at all times
//! - Ceiling: circulating supply <= max supply at all times
//! - Notifications: exactly one batch per successful mutation, in
//!   mutation order, never on failure
//!
//! # Example
//!
//! ```
//! use token_core::{Address, Ledger, TokenConfig};
//!
//! fn main() -> token_core::Result<()> {
//!     let treasurer = Address::new([1u8; 32]);
//!     let config = TokenConfig {
//!         name: "Aurum".to_string(),
//!         symbol: "AUR".to_string(),
//!         decimals: 18,
//!         max_supply: 1_000_000,
//!         authority: treasurer,
//!         unlock_at: None,
//!     };
//!     let mut ledger = Ledger::new(config)?;
//!     ledger.mint(treasurer, treasurer, 500_000)?;
//!     assert_eq!(ledger.total_supply(), 500_000);
//!     Ok(())
//! }
//! ```

use crate::access::Authority;
use crate::error::{Error, Result};
use crate::freeze::FreezeRegistry;
use crate::gate::{GateOverride, GateStatus, TransferGate};
use crate::math;
use crate::types::{Address, Amount, Notification};
use crate::TokenConfig;
use chrono::Utc;
use std::collections::HashMap;

/// The balances/allowances/supply accounting core
#[derive(Debug)]
pub struct Ledger {
    name: String,
    symbol: String,
    decimals: u8,
    max_supply: Amount,
    circulating: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    authority: Authority,
    freezes: FreezeRegistry,
    gate: TransferGate,
    notifications: Vec<Notification>,
}

impl Ledger {
    /// Build a ledger from a validated configuration
    pub fn new(config: TokenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            symbol: config.symbol,
            decimals: config.decimals,
            max_supply: config.max_supply,
            circulating: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            authority: Authority::new(config.authority),
            freezes: FreezeRegistry::new(),
            gate: TransferGate::new(config.unlock_at),
            notifications: Vec::new(),
        })
    }

    // Views

    /// Token display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal precision
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Configured supply ceiling
    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    /// Current circulating supply
    pub fn total_supply(&self) -> Amount {
        self.circulating
    }

    /// Balance of `account`, zero for unseen addresses
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Remaining authorization for `spender` over `owner`'s funds
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// True if `account` is frozen as a sender
    pub fn is_frozen(&self, account: Address) -> bool {
        self.freezes.is_frozen(account)
    }

    /// Current authority holder, `None` when the seat is vacant
    pub fn authority(&self) -> Option<Address> {
        self.authority.holder()
    }

    /// Gate status as of now; recomputed on every call, never cached
    pub fn gate_status(&self) -> GateStatus {
        self.gate.status(Utc::now())
    }

    /// Conservation check: Σ balances == circulating supply
    ///
    /// Holds by construction after every successful mutation; exposed
    /// for host-side auditing.
    pub fn conservation_holds(&self) -> bool {
        let sum = self
            .balances
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v));
        sum == Some(self.circulating)
    }

    /// Drain the pending notifications, in mutation order
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // Supply operations

    /// Mint `amount` new units to `to`; authority only
    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.authority.ensure(caller)?;
        if to.is_zero() {
            return Err(Error::ZeroAddress);
        }
        // circulating <= max_supply, so the headroom subtraction is total
        let headroom = self.max_supply - self.circulating;
        if amount > headroom {
            return Err(Error::SupplyCeiling {
                requested: amount,
                max_supply: self.max_supply,
            });
        }
        let credited = math::add(self.balance_of(to), amount)?;

        self.circulating += amount;
        self.set_balance(to, credited);
        self.notifications.push(Notification::Transfer {
            from: None,
            to: Some(to),
            amount,
        });

        tracing::info!(to = %to, amount = %amount, supply = %self.circulating, "mint");
        debug_assert!(self.conservation_holds());
        Ok(())
    }

    /// Burn `amount` units from `from`
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<()> {
        if from.is_zero() {
            return Err(Error::ZeroAddress);
        }
        if amount == 0 {
            return Err(Error::AmountZero);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(Error::InsufficientBalance {
                required: amount,
                available,
            });
        }
        let debited = math::sub_ctx(available, amount, "burn balance")?;
        let supply = math::sub_ctx(self.circulating, amount, "burn supply")?;

        self.circulating = supply;
        self.set_balance(from, debited);
        self.notifications.push(Notification::Transfer {
            from: Some(from),
            to: None,
            amount,
        });

        tracing::info!(from = %from, amount = %amount, supply = %self.circulating, "burn");
        debug_assert!(self.conservation_holds());
        Ok(())
    }

    // Transfer operations

    /// Move `amount` from `from` to `to`
    ///
    /// Preconditions are checked in a fixed, observable order: open
    /// gate, unfrozen sender, non-zero addresses, sufficient funds. The
    /// first violated precondition's error is returned.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        let now = Utc::now();
        if self.gate.status(now) == GateStatus::Locked {
            return Err(Error::TransfersLocked {
                unlock_at: self.gate.unlock_at(),
            });
        }
        if self.freezes.is_frozen(from) {
            return Err(Error::AccountFrozen(from));
        }
        if from.is_zero() || to.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(Error::InsufficientBalance {
                required: amount,
                available,
            });
        }
        let debited = math::sub_ctx(available, amount, "transfer debit")?;
        // Debit and credit land on the same key for a self-transfer and
        // cancel out; the later write must restore the full balance
        let credited = if from == to {
            available
        } else {
            math::add(self.balance_of(to), amount)?
        };

        self.set_balance(from, debited);
        self.set_balance(to, credited);
        self.notifications.push(Notification::Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });

        tracing::debug!(from = %from, to = %to, amount = %amount, "transfer");
        debug_assert!(self.conservation_holds());
        Ok(())
    }

    /// Transfer on behalf of `from`, consuming `caller`'s allowance
    ///
    /// Allowance sufficiency is validated before balances move, so a
    /// shortfall at either step leaves all state untouched.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        if caller.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let available = self.allowance(from, caller);
        if available < amount {
            return Err(Error::InsufficientAllowance {
                required: amount,
                available,
            });
        }
        let remaining = math::sub_ctx(available, amount, "allowance consumption")?;

        self.transfer(from, to, amount)?;
        self.set_allowance(from, caller, remaining);

        tracing::debug!(caller = %caller, owner = %from, remaining = %remaining, "allowance consumed");
        Ok(())
    }

    // Allowance operations

    /// Set `spender`'s allowance over `owner`'s funds to exactly `amount`
    ///
    /// This is an absolute overwrite, and it carries the classic
    /// in-flight race: an owner changing N to M while a spend of N is
    /// pending can see both take effect. Callers wanting safe
    /// adjustment should use `increase_allowance`/`decrease_allowance`.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(Error::ZeroAddress);
        }
        self.set_allowance(owner, spender, amount);
        self.notifications.push(Notification::Approval {
            owner,
            spender,
            amount,
        });

        tracing::debug!(owner = %owner, spender = %spender, amount = %amount, "approve");
        Ok(())
    }

    /// Raise an allowance by `delta`
    pub fn increase_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        delta: Amount,
    ) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let amount = math::add(self.allowance(owner, spender), delta)?;
        self.set_allowance(owner, spender, amount);
        self.notifications.push(Notification::Approval {
            owner,
            spender,
            amount,
        });

        tracing::debug!(owner = %owner, spender = %spender, amount = %amount, "increase allowance");
        Ok(())
    }

    /// Lower an allowance by `delta`; never floors below zero
    pub fn decrease_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        delta: Amount,
    ) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(Error::ZeroAddress);
        }
        let available = self.allowance(owner, spender);
        if available < delta {
            return Err(Error::InsufficientAllowance {
                required: delta,
                available,
            });
        }
        let amount = math::sub_ctx(available, delta, "allowance decrease")?;
        self.set_allowance(owner, spender, amount);
        self.notifications.push(Notification::Approval {
            owner,
            spender,
            amount,
        });

        tracing::debug!(owner = %owner, spender = %spender, amount = %amount, "decrease allowance");
        Ok(())
    }

    // Freeze operations

    /// Freeze `account` as a sender; authority or the account itself
    pub fn freeze(&mut self, caller: Address, account: Address) -> Result<()> {
        if account.is_zero() {
            return Err(Error::ZeroAddress);
        }
        if caller != account {
            self.authority.ensure(caller)?;
        }
        self.freezes.freeze(account)?;
        tracing::info!(account = %account, by = %caller, "account frozen");
        Ok(())
    }

    /// Clear the freeze flag on `account`; authority only
    pub fn unfreeze(&mut self, caller: Address, account: Address) -> Result<()> {
        if account.is_zero() {
            return Err(Error::ZeroAddress);
        }
        self.authority.ensure(caller)?;
        self.freezes.unfreeze(account)?;
        tracing::info!(account = %account, "account unfrozen");
        Ok(())
    }

    // Authority operations

    /// Hand the authority seat to `new`; holder only
    pub fn transfer_authority(&mut self, caller: Address, new: Address) -> Result<()> {
        let previous = self.authority.transfer(caller, new)?;
        self.notifications.push(Notification::AuthorityChanged {
            previous: Some(previous),
            next: Some(new),
        });
        tracing::info!(previous = %previous, next = %new, "authority transferred");
        Ok(())
    }

    /// Vacate the authority seat; holder only
    pub fn renounce_authority(&mut self, caller: Address) -> Result<()> {
        let previous = self.authority.renounce(caller)?;
        self.notifications.push(Notification::AuthorityChanged {
            previous: Some(previous),
            next: None,
        });
        tracing::info!(previous = %previous, "authority renounced");
        Ok(())
    }

    /// Claim a vacant authority seat; first caller wins
    pub fn claim_authority(&mut self, caller: Address) -> Result<()> {
        self.authority.claim(caller)?;
        self.notifications.push(Notification::AuthorityChanged {
            previous: None,
            next: Some(caller),
        });
        tracing::info!(next = %caller, "authority claimed");
        Ok(())
    }

    // Gate operations

    /// Pin the gate shut; authority only, idempotent
    pub fn lock(&mut self, caller: Address) -> Result<GateOverride> {
        self.authority.ensure(caller)?;
        let outcome = self.gate.lock();
        if outcome == GateOverride::Applied {
            tracing::info!("transfer gate locked");
        }
        Ok(outcome)
    }

    /// Pin the gate open; authority only, idempotent
    pub fn unlock(&mut self, caller: Address) -> Result<GateOverride> {
        self.authority.ensure(caller)?;
        let outcome = self.gate.unlock();
        if outcome == GateOverride::Applied {
            tracing::info!("transfer gate unlocked");
        }
        Ok(outcome)
    }

    // Internals

    fn set_balance(&mut self, account: Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const fn addr(tag: u8) -> Address {
        let mut bytes = [0u8; 32];
        bytes[31] = tag;
        Address::new(bytes)
    }

    const TREASURER: Address = addr(1);
    const ALICE: Address = addr(2);
    const BOB: Address = addr(3);
    const CAROL: Address = addr(4);

    fn config() -> TokenConfig {
        TokenConfig {
            name: "Aurum".to_string(),
            symbol: "AUR".to_string(),
            decimals: 18,
            max_supply: 1_000_000,
            authority: TREASURER,
            unlock_at: None,
        }
    }

    fn ledger() -> Ledger {
        Ledger::new(config()).unwrap()
    }

    fn funded_ledger() -> Ledger {
        let mut l = ledger();
        l.mint(TREASURER, ALICE, 1_000).unwrap();
        l.drain_notifications();
        l
    }

    #[test]
    fn test_new_validates_config() {
        let mut bad = config();
        bad.authority = Address::ZERO;
        assert!(matches!(Ledger::new(bad), Err(Error::Config(_))));
    }

    #[test]
    fn test_mint_requires_authority() {
        let mut l = ledger();
        assert_eq!(l.mint(ALICE, ALICE, 10), Err(Error::Unauthorized));
        assert_eq!(l.total_supply(), 0);
        assert!(l.drain_notifications().is_empty());
    }

    #[test]
    fn test_mint_rejects_zero_recipient() {
        let mut l = ledger();
        assert_eq!(
            l.mint(TREASURER, Address::ZERO, 10),
            Err(Error::ZeroAddress)
        );
    }

    #[test]
    fn test_mint_enforces_ceiling_without_mutation() {
        let mut l = ledger();
        l.mint(TREASURER, ALICE, 1_000_000).unwrap();
        assert_eq!(l.balance_of(ALICE), 1_000_000);

        let err = l.mint(TREASURER, BOB, 1).unwrap_err();
        assert_eq!(
            err,
            Error::SupplyCeiling {
                requested: 1,
                max_supply: 1_000_000
            }
        );
        assert_eq!(l.total_supply(), 1_000_000);
        assert_eq!(l.balance_of(BOB), 0);
        assert!(l.conservation_holds());
    }

    #[test]
    fn test_burn_round_trip() {
        let mut l = funded_ledger();
        l.burn(ALICE, 400).unwrap();
        assert_eq!(l.balance_of(ALICE), 600);
        assert_eq!(l.total_supply(), 600);
        assert_eq!(
            l.drain_notifications(),
            vec![Notification::Transfer {
                from: Some(ALICE),
                to: None,
                amount: 400
            }]
        );
    }

    #[test]
    fn test_burn_rejections() {
        let mut l = funded_ledger();
        assert_eq!(l.burn(Address::ZERO, 1), Err(Error::ZeroAddress));
        assert_eq!(l.burn(ALICE, 0), Err(Error::AmountZero));
        assert_eq!(
            l.burn(ALICE, 1_001),
            Err(Error::InsufficientBalance {
                required: 1_001,
                available: 1_000
            })
        );
        assert_eq!(l.total_supply(), 1_000);
    }

    #[test]
    fn test_transfer_moves_funds() {
        let mut l = funded_ledger();
        l.transfer(ALICE, BOB, 300).unwrap();
        assert_eq!(l.balance_of(ALICE), 700);
        assert_eq!(l.balance_of(BOB), 300);
        assert_eq!(l.total_supply(), 1_000);
        assert!(l.conservation_holds());
    }

    #[test]
    fn test_transfer_precondition_order() {
        let mut bootstrap = config();
        bootstrap.unlock_at = Some(Utc::now() + Duration::days(365));
        let mut l = Ledger::new(bootstrap).unwrap();

        // Gate outranks every other violation: frozen zero-balance
        // sender, zero recipient, and the error is still TransfersLocked
        l.freeze(TREASURER, ALICE).unwrap();
        assert!(matches!(
            l.transfer(ALICE, Address::ZERO, 5),
            Err(Error::TransfersLocked { .. })
        ));

        l.unlock(TREASURER).unwrap();

        // Next in line: the freeze flag
        assert_eq!(
            l.transfer(ALICE, Address::ZERO, 5),
            Err(Error::AccountFrozen(ALICE))
        );

        l.unfreeze(TREASURER, ALICE).unwrap();

        // Then null addresses, then funds
        assert_eq!(l.transfer(ALICE, Address::ZERO, 5), Err(Error::ZeroAddress));
        assert_eq!(
            l.transfer(ALICE, BOB, 5),
            Err(Error::InsufficientBalance {
                required: 5,
                available: 0
            })
        );
    }

    #[test]
    fn test_self_transfer_is_neutral() {
        let mut l = funded_ledger();
        l.transfer(ALICE, ALICE, 250).unwrap();
        assert_eq!(l.balance_of(ALICE), 1_000);
        assert!(l.conservation_holds());
        // Still notifies
        assert_eq!(l.drain_notifications().len(), 1);
    }

    #[test]
    fn test_zero_amount_transfer_allowed() {
        let mut l = funded_ledger();
        l.transfer(ALICE, BOB, 0).unwrap();
        assert_eq!(l.balance_of(ALICE), 1_000);
        assert_eq!(l.balance_of(BOB), 0);
    }

    #[test]
    fn test_approve_is_overwrite() {
        let mut l = funded_ledger();
        l.approve(ALICE, CAROL, 100).unwrap();
        l.approve(ALICE, CAROL, 40).unwrap();
        assert_eq!(l.allowance(ALICE, CAROL), 40);
    }

    #[test]
    fn test_allowance_adjustments() {
        let mut l = funded_ledger();
        l.increase_allowance(ALICE, CAROL, 70).unwrap();
        l.increase_allowance(ALICE, CAROL, 30).unwrap();
        assert_eq!(l.allowance(ALICE, CAROL), 100);

        l.decrease_allowance(ALICE, CAROL, 100).unwrap();
        assert_eq!(l.allowance(ALICE, CAROL), 0);

        assert_eq!(
            l.decrease_allowance(ALICE, CAROL, 1),
            Err(Error::InsufficientAllowance {
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut l = funded_ledger();
        l.approve(ALICE, CAROL, 500).unwrap();
        l.transfer_from(CAROL, ALICE, BOB, 200).unwrap();
        assert_eq!(l.balance_of(ALICE), 800);
        assert_eq!(l.balance_of(BOB), 200);
        assert_eq!(l.allowance(ALICE, CAROL), 300);
    }

    #[test]
    fn test_transfer_from_insufficient_allowance_is_atomic() {
        let mut l = funded_ledger();
        l.approve(ALICE, CAROL, 100).unwrap();
        l.drain_notifications();

        let err = l.transfer_from(CAROL, ALICE, BOB, 150).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientAllowance {
                required: 150,
                available: 100
            }
        );
        assert_eq!(l.balance_of(ALICE), 1_000);
        assert_eq!(l.balance_of(BOB), 0);
        assert_eq!(l.allowance(ALICE, CAROL), 100);
        assert!(l.drain_notifications().is_empty());
    }

    #[test]
    fn test_transfer_from_frozen_sender_keeps_allowance() {
        let mut l = funded_ledger();
        l.approve(ALICE, CAROL, 500).unwrap();
        l.freeze(TREASURER, ALICE).unwrap();

        assert_eq!(
            l.transfer_from(CAROL, ALICE, BOB, 200),
            Err(Error::AccountFrozen(ALICE))
        );
        assert_eq!(l.allowance(ALICE, CAROL), 500);
        assert_eq!(l.balance_of(ALICE), 1_000);
    }

    #[test]
    fn test_freeze_gating_lifecycle() {
        let mut l = funded_ledger();
        l.freeze(TREASURER, ALICE).unwrap();
        assert_eq!(
            l.transfer(ALICE, BOB, 1),
            Err(Error::AccountFrozen(ALICE))
        );
        // Frozen accounts can still receive
        l.mint(TREASURER, ALICE, 1).unwrap();

        let err = l.freeze(TREASURER, ALICE).unwrap_err();
        assert!(matches!(err, Error::AlreadyInState(_)));

        l.unfreeze(TREASURER, ALICE).unwrap();
        l.transfer(ALICE, BOB, 1).unwrap();
    }

    #[test]
    fn test_freeze_authorization() {
        let mut l = funded_ledger();
        // Self-inflicted freeze is allowed
        l.freeze(ALICE, ALICE).unwrap();
        // But a frozen account cannot free itself
        assert_eq!(l.unfreeze(ALICE, ALICE), Err(Error::Unauthorized));
        // And third parties cannot freeze others
        assert_eq!(l.freeze(BOB, CAROL), Err(Error::Unauthorized));
        l.unfreeze(TREASURER, ALICE).unwrap();
    }

    #[test]
    fn test_gate_override_authorization_and_idempotence() {
        let mut l = funded_ledger();
        assert_eq!(l.lock(ALICE), Err(Error::Unauthorized));

        assert_eq!(l.lock(TREASURER), Ok(GateOverride::Applied));
        assert!(matches!(
            l.transfer(ALICE, BOB, 1),
            Err(Error::TransfersLocked { .. })
        ));
        assert_eq!(l.lock(TREASURER), Ok(GateOverride::Unchanged));

        assert_eq!(l.unlock(TREASURER), Ok(GateOverride::Applied));
        assert_eq!(l.unlock(TREASURER), Ok(GateOverride::Unchanged));
        l.transfer(ALICE, BOB, 1).unwrap();
    }

    #[test]
    fn test_authority_lifecycle_and_events() {
        let mut l = ledger();
        l.transfer_authority(TREASURER, ALICE).unwrap();
        l.renounce_authority(ALICE).unwrap();
        assert_eq!(l.authority(), None);

        // Mint with a vacant seat is unauthorized
        assert_eq!(l.mint(TREASURER, BOB, 1), Err(Error::Unauthorized));

        l.claim_authority(BOB).unwrap();
        l.mint(BOB, BOB, 1).unwrap();

        let notes = l.drain_notifications();
        assert_eq!(
            notes,
            vec![
                Notification::AuthorityChanged {
                    previous: Some(TREASURER),
                    next: Some(ALICE)
                },
                Notification::AuthorityChanged {
                    previous: Some(ALICE),
                    next: None
                },
                Notification::AuthorityChanged {
                    previous: None,
                    next: Some(BOB)
                },
                Notification::Transfer {
                    from: None,
                    to: Some(BOB),
                    amount: 1
                },
            ]
        );
    }

    #[test]
    fn test_notifications_in_mutation_order_and_only_on_success() {
        let mut l = funded_ledger();
        l.transfer(ALICE, BOB, 10).unwrap();
        l.approve(ALICE, CAROL, 5).unwrap();
        let _ = l.transfer(ALICE, BOB, 1_000_000); // fails, must not notify

        let notes = l.drain_notifications();
        assert_eq!(notes.len(), 2);
        assert!(matches!(notes[0], Notification::Transfer { .. }));
        assert!(matches!(notes[1], Notification::Approval { .. }));

        // Drained means drained
        assert!(l.drain_notifications().is_empty());
    }
}
