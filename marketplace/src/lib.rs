//! Marketplace facade — the single entry point for external callers.
//!
//! API handlers hand every request here as a validated value plus a
//! request-scoped [`RequestContext`]; the facade sequences the ledger,
//! session, verification, and reputation engines into atomic use cases.
//! The engines never call each other; only this crate composes them.

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod facade;
pub mod notify;

pub use config::{ConfigError, MarketConfig};
pub use context::RequestContext;
pub use error::MarketError;
pub use event::{EventBus, MarketEvent};
pub use facade::{BookSessionRequest, CompleteSessionRequest, MarketStore, Marketplace};
pub use notify::{Notification, Notifier, NotifyError};
