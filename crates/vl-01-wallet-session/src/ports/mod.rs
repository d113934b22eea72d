//! # Ports Module
//!
//! Hexagonal architecture ports. The session service is driven directly by
//! the runtime, so only outbound dependencies are abstracted here.

pub mod outbound;

pub use outbound::*;
