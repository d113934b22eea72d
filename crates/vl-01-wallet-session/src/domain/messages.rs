//! # User-Facing Messages
//!
//! Notification copy emitted by the session subsystem. Codes are stable
//! identifiers; messages are display text.

/// Notification code for an unsupported network.
pub const CODE_NETWORK_NOT_SUPPORTED: &str = "networkNotSupported";

/// Shown when the node's chain id is not in the registry or the ledger
/// contract is not deployed there.
pub const NETWORK_NOT_SUPPORTED: &str = "Please switch your network to either 'Localhost' or \
     'Sepolia' in your MetaMask to continue. The current network is not supported.";

/// Notification code for a failed balance refresh.
pub const CODE_BALANCE_UNAVAILABLE: &str = "balanceUnavailable";

/// Shown when the balance fetch fails; the session itself stays up.
pub const BALANCE_UNAVAILABLE: &str = "Could not fetch the account balance.";
