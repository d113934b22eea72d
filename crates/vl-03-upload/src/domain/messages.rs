//! # User-Facing Messages
//!
//! Notification copy emitted by the upload subsystem. Codes are stable
//! identifiers; messages are display text.

/// Notification code for a broadcast upload transaction.
pub const CODE_TRANSACTION_SENT: &str = "transactionSent";

/// Shown as soon as the node accepts the upload transaction, before it is
/// mined.
pub const TRANSACTION_SENT: &str = "Transaction sent successfully!";
