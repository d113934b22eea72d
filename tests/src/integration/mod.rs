//! Cross-subsystem flows over the wired runtime.

pub mod ledger_flows;
pub mod session_flows;
pub mod upload_flows;
