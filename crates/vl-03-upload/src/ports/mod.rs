//! # Ports Module
//!
//! The upload subsystem's one outbound dependency beyond the session: the
//! content store that turns bytes into a CID.

pub mod outbound;

pub use outbound::*;
