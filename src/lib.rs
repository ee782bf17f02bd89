// src/lib.rs
//! Transaction construction, wallet signing and account data for an
//! Algorand portfolio dashboard.

pub mod application;
pub mod blockchain;
pub mod core;

pub use crate::application::Dashboard;
pub use crate::core::errors::{TxFlowError, TxResult};
