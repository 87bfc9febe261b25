//! CSV adapters used by the command-line replay tool.

pub mod history_writer;
pub mod payment_reader;
