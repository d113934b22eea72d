//! # Application Module
//!
//! Session orchestration: the connect/disconnect lifecycle and the live
//! session object handed to the other subsystems.

pub mod service;

pub use service::{Session, SessionService};
