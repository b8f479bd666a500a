//! Actor-based concurrency for the ledger
//!
//! The ledger itself is a plain single-threaded value; this module is
//! the async embedding that gives a multi-tasking host the execution
//! model the ledger assumes: one logical writer, every call running to
//! completion before the next begins.
//!
//! - A single Tokio task owns the `Ledger`
//! - A bounded mailbox serializes calls and provides backpressure
//! - Notifications fan out over a broadcast channel after each
//!   successful mutation, in mutation order
//! - Metrics are recorded per operation when a collector is attached

use crate::error::{Error, Result};
use crate::gate::{GateOverride, GateStatus};
use crate::ledger::Ledger;
use crate::metrics::Metrics;
use crate::types::{Address, Amount, Notification};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Mailbox depth; sends beyond this apply backpressure
const MAILBOX_CAPACITY: usize = 1024;

/// Broadcast buffer for notification subscribers
const EVENT_CAPACITY: usize = 1024;

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Mint new units
    Mint {
        caller: Address,
        to: Address,
        amount: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Burn units
    Burn {
        from: Address,
        amount: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Move units between accounts
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Delegated transfer consuming the caller's allowance
    TransferFrom {
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Set an allowance absolutely
    Approve {
        owner: Address,
        spender: Address,
        amount: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Raise an allowance
    IncreaseAllowance {
        owner: Address,
        spender: Address,
        delta: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Lower an allowance
    DecreaseAllowance {
        owner: Address,
        spender: Address,
        delta: Amount,
        response: oneshot::Sender<Result<()>>,
    },

    /// Freeze an account as a sender
    Freeze {
        caller: Address,
        account: Address,
        response: oneshot::Sender<Result<()>>,
    },

    /// Clear an account's freeze flag
    Unfreeze {
        caller: Address,
        account: Address,
        response: oneshot::Sender<Result<()>>,
    },

    /// Hand the authority seat over
    TransferAuthority {
        caller: Address,
        new: Address,
        response: oneshot::Sender<Result<()>>,
    },

    /// Vacate the authority seat
    RenounceAuthority {
        caller: Address,
        response: oneshot::Sender<Result<()>>,
    },

    /// Claim a vacant authority seat
    ClaimAuthority {
        caller: Address,
        response: oneshot::Sender<Result<()>>,
    },

    /// Pin the transfer gate shut
    Lock {
        caller: Address,
        response: oneshot::Sender<Result<GateOverride>>,
    },

    /// Pin the transfer gate open
    Unlock {
        caller: Address,
        response: oneshot::Sender<Result<GateOverride>>,
    },

    /// Read a balance
    BalanceOf {
        account: Address,
        response: oneshot::Sender<Amount>,
    },

    /// Read the circulating supply
    TotalSupply { response: oneshot::Sender<Amount> },

    /// Read an allowance
    Allowance {
        owner: Address,
        spender: Address,
        response: oneshot::Sender<Amount>,
    },

    /// Read an account's freeze flag
    IsFrozen {
        account: Address,
        response: oneshot::Sender<bool>,
    },

    /// Read the current authority holder
    AuthorityHolder {
        response: oneshot::Sender<Option<Address>>,
    },

    /// Read the gate status as of now
    GateStatus {
        response: oneshot::Sender<GateStatus>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Which counter a successful mutation bumps
enum Op {
    Mint,
    Burn,
    Transfer,
    Approval,
    Admin,
}

/// Actor that owns the ledger and processes messages
#[derive(Debug)]
pub struct LedgerActor {
    ledger: Ledger,
    mailbox: mpsc::Receiver<LedgerMessage>,
    events: broadcast::Sender<Notification>,
    metrics: Option<Metrics>,
}

impl LedgerActor {
    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                other => self.handle_message(other),
            }
        }
        tracing::debug!("ledger actor stopped");
    }

    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Mint {
                caller,
                to,
                amount,
                response,
            } => {
                let result = self.ledger.mint(caller, to, amount);
                self.finish_mutation(&result, Op::Mint);
                let _ = response.send(result);
            }

            LedgerMessage::Burn {
                from,
                amount,
                response,
            } => {
                let result = self.ledger.burn(from, amount);
                self.finish_mutation(&result, Op::Burn);
                let _ = response.send(result);
            }

            LedgerMessage::Transfer {
                from,
                to,
                amount,
                response,
            } => {
                let result = self.ledger.transfer(from, to, amount);
                self.finish_mutation(&result, Op::Transfer);
                let _ = response.send(result);
            }

            LedgerMessage::TransferFrom {
                caller,
                from,
                to,
                amount,
                response,
            } => {
                let result = self.ledger.transfer_from(caller, from, to, amount);
                self.finish_mutation(&result, Op::Transfer);
                let _ = response.send(result);
            }

            LedgerMessage::Approve {
                owner,
                spender,
                amount,
                response,
            } => {
                let result = self.ledger.approve(owner, spender, amount);
                self.finish_mutation(&result, Op::Approval);
                let _ = response.send(result);
            }

            LedgerMessage::IncreaseAllowance {
                owner,
                spender,
                delta,
                response,
            } => {
                let result = self.ledger.increase_allowance(owner, spender, delta);
                self.finish_mutation(&result, Op::Approval);
                let _ = response.send(result);
            }

            LedgerMessage::DecreaseAllowance {
                owner,
                spender,
                delta,
                response,
            } => {
                let result = self.ledger.decrease_allowance(owner, spender, delta);
                self.finish_mutation(&result, Op::Approval);
                let _ = response.send(result);
            }

            LedgerMessage::Freeze {
                caller,
                account,
                response,
            } => {
                let result = self.ledger.freeze(caller, account);
                self.finish_mutation(&result, Op::Admin);
                let _ = response.send(result);
            }

            LedgerMessage::Unfreeze {
                caller,
                account,
                response,
            } => {
                let result = self.ledger.unfreeze(caller, account);
                self.finish_mutation(&result, Op::Admin);
                let _ = response.send(result);
            }

            LedgerMessage::TransferAuthority {
                caller,
                new,
                response,
            } => {
                let result = self.ledger.transfer_authority(caller, new);
                self.finish_mutation(&result, Op::Admin);
                let _ = response.send(result);
            }

            LedgerMessage::RenounceAuthority { caller, response } => {
                let result = self.ledger.renounce_authority(caller);
                self.finish_mutation(&result, Op::Admin);
                let _ = response.send(result);
            }

            LedgerMessage::ClaimAuthority { caller, response } => {
                let result = self.ledger.claim_authority(caller);
                self.finish_mutation(&result, Op::Admin);
                let _ = response.send(result);
            }

            LedgerMessage::Lock { caller, response } => {
                let result = self.ledger.lock(caller);
                self.finish_override(&result);
                let _ = response.send(result);
            }

            LedgerMessage::Unlock { caller, response } => {
                let result = self.ledger.unlock(caller);
                self.finish_override(&result);
                let _ = response.send(result);
            }

            LedgerMessage::BalanceOf { account, response } => {
                let _ = response.send(self.ledger.balance_of(account));
            }

            LedgerMessage::TotalSupply { response } => {
                let _ = response.send(self.ledger.total_supply());
            }

            LedgerMessage::Allowance {
                owner,
                spender,
                response,
            } => {
                let _ = response.send(self.ledger.allowance(owner, spender));
            }

            LedgerMessage::IsFrozen { account, response } => {
                let _ = response.send(self.ledger.is_frozen(account));
            }

            LedgerMessage::AuthorityHolder { response } => {
                let _ = response.send(self.ledger.authority());
            }

            LedgerMessage::GateStatus { response } => {
                let _ = response.send(self.ledger.gate_status());
            }

            LedgerMessage::Shutdown => {
                // Handled in the main loop
            }
        }
    }

    /// Publish notifications and record metrics after a mutation
    fn finish_mutation(&mut self, result: &Result<()>, op: Op) {
        match result {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    match op {
                        Op::Mint => metrics.record_mint(),
                        Op::Burn => metrics.record_burn(),
                        Op::Transfer => metrics.record_transfer(),
                        Op::Approval => metrics.record_approval(),
                        Op::Admin => {}
                    }
                    metrics.update_supply(self.ledger.total_supply());
                }
                for note in self.ledger.drain_notifications() {
                    // No subscribers is fine; notifications are
                    // fire-and-forget
                    let _ = self.events.send(note);
                }
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejection(e.kind());
                }
            }
        }
    }

    fn finish_override(&mut self, result: &Result<GateOverride>) {
        if let Err(e) = result {
            if let Some(metrics) = &self.metrics {
                metrics.record_rejection(e.kind());
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
    events: broadcast::Sender<Notification>,
}

impl LedgerHandle {
    /// Subscribe to the notification stream
    ///
    /// Only notifications emitted after the subscription are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))
    }

    /// Mint new units
    pub async fn mint(&self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.call(|response| LedgerMessage::Mint {
            caller,
            to,
            amount,
            response,
        })
        .await?
    }

    /// Burn units
    pub async fn burn(&self, from: Address, amount: Amount) -> Result<()> {
        self.call(|response| LedgerMessage::Burn {
            from,
            amount,
            response,
        })
        .await?
    }

    /// Move units between accounts
    pub async fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<()> {
        self.call(|response| LedgerMessage::Transfer {
            from,
            to,
            amount,
            response,
        })
        .await?
    }

    /// Delegated transfer consuming the caller's allowance
    pub async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.call(|response| LedgerMessage::TransferFrom {
            caller,
            from,
            to,
            amount,
            response,
        })
        .await?
    }

    /// Set an allowance absolutely
    pub async fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<()> {
        self.call(|response| LedgerMessage::Approve {
            owner,
            spender,
            amount,
            response,
        })
        .await?
    }

    /// Raise an allowance
    pub async fn increase_allowance(
        &self,
        owner: Address,
        spender: Address,
        delta: Amount,
    ) -> Result<()> {
        self.call(|response| LedgerMessage::IncreaseAllowance {
            owner,
            spender,
            delta,
            response,
        })
        .await?
    }

    /// Lower an allowance
    pub async fn decrease_allowance(
        &self,
        owner: Address,
        spender: Address,
        delta: Amount,
    ) -> Result<()> {
        self.call(|response| LedgerMessage::DecreaseAllowance {
            owner,
            spender,
            delta,
            response,
        })
        .await?
    }

    /// Freeze an account as a sender
    pub async fn freeze(&self, caller: Address, account: Address) -> Result<()> {
        self.call(|response| LedgerMessage::Freeze {
            caller,
            account,
            response,
        })
        .await?
    }

    /// Clear an account's freeze flag
    pub async fn unfreeze(&self, caller: Address, account: Address) -> Result<()> {
        self.call(|response| LedgerMessage::Unfreeze {
            caller,
            account,
            response,
        })
        .await?
    }

    /// Hand the authority seat over
    pub async fn transfer_authority(&self, caller: Address, new: Address) -> Result<()> {
        self.call(|response| LedgerMessage::TransferAuthority {
            caller,
            new,
            response,
        })
        .await?
    }

    /// Vacate the authority seat
    pub async fn renounce_authority(&self, caller: Address) -> Result<()> {
        self.call(|response| LedgerMessage::RenounceAuthority { caller, response })
            .await?
    }

    /// Claim a vacant authority seat
    pub async fn claim_authority(&self, caller: Address) -> Result<()> {
        self.call(|response| LedgerMessage::ClaimAuthority { caller, response })
            .await?
    }

    /// Pin the transfer gate shut
    pub async fn lock(&self, caller: Address) -> Result<GateOverride> {
        self.call(|response| LedgerMessage::Lock { caller, response })
            .await?
    }

    /// Pin the transfer gate open
    pub async fn unlock(&self, caller: Address) -> Result<GateOverride> {
        self.call(|response| LedgerMessage::Unlock { caller, response })
            .await?
    }

    /// Read a balance
    pub async fn balance_of(&self, account: Address) -> Result<Amount> {
        self.call(|response| LedgerMessage::BalanceOf { account, response })
            .await
    }

    /// Read the circulating supply
    pub async fn total_supply(&self) -> Result<Amount> {
        self.call(|response| LedgerMessage::TotalSupply { response })
            .await
    }

    /// Read an allowance
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<Amount> {
        self.call(|response| LedgerMessage::Allowance {
            owner,
            spender,
            response,
        })
        .await
    }

    /// Read an account's freeze flag
    pub async fn is_frozen(&self, account: Address) -> Result<bool> {
        self.call(|response| LedgerMessage::IsFrozen { account, response })
            .await
    }

    /// Read the current authority holder
    pub async fn authority(&self) -> Result<Option<Address>> {
        self.call(|response| LedgerMessage::AuthorityHolder { response })
            .await
    }

    /// Read the gate status as of now
    pub async fn gate_status(&self) -> Result<GateStatus> {
        self.call(|response| LedgerMessage::GateStatus { response })
            .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor, returning its handle
pub fn spawn_ledger_actor(ledger: Ledger, metrics: Option<Metrics>) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    let (events, _) = broadcast::channel(EVENT_CAPACITY);

    let actor = LedgerActor {
        ledger,
        mailbox: rx,
        events: events.clone(),
        metrics,
    };

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle { sender: tx, events }
}
