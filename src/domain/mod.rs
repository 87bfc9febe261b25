//! Domain model of the auto-withdrawal engine: value types, the threshold
//! policy and the ports the application layer drives.

pub mod amount;
pub mod balance;
pub mod mint;
pub mod payment_history;
pub mod policy;
pub mod ports;
pub mod quote;
pub mod settings;
pub mod withdrawal;
