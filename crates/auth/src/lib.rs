//! Authorization building blocks shared by every service that accepts
//! external calls.
//!
//! The crate provides:
//! - the [`TokenStore`] contract and its in-process implementation
//! - the administered [`ApiWhitelist`] of methods exempt from token checks
//! - the [`AuthService`] facade owning both
//! - the [`AuthClient`] capability consumed by interceptors, so services
//!   hold an injected interface rather than a process-wide client
//! - [`authorize`], the fail-closed per-call decision applied before any
//!   handler runs

pub mod client;
pub mod error;
pub mod interceptor;
pub mod service;
pub mod token;
pub mod whitelist;

pub use client::{AuthClient, InProcessAuthClient};
pub use error::AuthError;
pub use interceptor::{TOKEN_EXTENSION_SECS, authorize};
pub use service::AuthService;
pub use token::{AccessToken, DEFAULT_TOKEN_TTL_SECS, InMemoryTokenStore, TokenStore};
pub use whitelist::ApiWhitelist;
