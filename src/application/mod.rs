//! Application layer: the check cycle and the withdrawal state machine.
//!
//! [`service::AutoWithdrawService`] is the entry point. It owns the in-flight
//! slot, takes balance snapshots, asks the policy for a candidate and hands it
//! to the [`orchestrator::WithdrawalOrchestrator`].

pub mod aggregator;
mod blob;
pub mod ledger;
pub mod notifier;
pub mod orchestrator;
pub mod payment_history;
pub mod service;
pub mod single_flight;
