//! # Domain Module
//!
//! Core domain types for the wallet session: fee data, the network
//! registry, the ledger contract binding, and error types.

pub mod contract;
pub mod entities;
pub mod errors;
pub mod messages;
pub mod registry;

pub use contract::*;
pub use entities::*;
pub use errors::*;
pub use registry::*;

/// Bus subsystem id of the wallet session.
pub const SUBSYSTEM_ID: u8 = 1;
