//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! All communication between the wallet session, ledger sync, and upload
//! subsystems flows through this bus. Direct calls between subsystems are
//! limited to the ports the wallet session exposes; everything asynchronous
//! is an event.
//!
//! ## Choreography
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Upload (3)   │                    │ Ledger (2)   │
//! │              │  UploadConfirmed   │              │
//! │              │ ──────┐            │  merge(video)│
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  │              │  subscribe()
//!                  └──────────────┘
//! ```
//!
//! The runtime subscribes to everything and renders notifications; the
//! ledger subscribes to upload confirmations and merges them idempotently.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ClientEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
