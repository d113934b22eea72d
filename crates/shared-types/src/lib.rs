//! # Shared Types Crate
//!
//! This crate contains the domain entities, notification types, and provider
//! error types shared by every VidLedger subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **No Wire Logic**: Encoding and hashing live in `shared-evm`; this crate
//!   holds plain data.
//! - **Subsystem-Neutral**: Nothing here may depend on a `vl-*` crate.

pub mod entities;
pub mod errors;
pub mod notifications;

pub use entities::*;
pub use errors::*;
pub use notifications::*;
