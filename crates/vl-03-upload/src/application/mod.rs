//! Application layer for the upload subsystem.

pub mod service;

pub use service::UploadService;
