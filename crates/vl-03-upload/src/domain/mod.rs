//! # Upload Domain
//!
//! The submission record, content-id derivation, and error types.

pub mod content;
pub mod errors;
pub mod messages;
pub mod submission;

pub use errors::{StoreError, UploadError};
pub use submission::Submission;

/// Bus subsystem id of the upload subsystem.
pub const SUBSYSTEM_ID: u8 = 3;
