//! Session configuration and discovery caching for Lobbyforge.
//!
//! This crate holds the caller-facing session data:
//!
//! 1. **Configuration** — what kind of session to host ([`SessionConfig`])
//! 2. **Settings builder** — the pure transform into the provider-neutral
//!    attribute bag ([`build_attributes`])
//! 3. **Search cache** — the latest discovery snapshot, replaced wholesale
//!    ([`SearchResultCache`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrator (above)  ← reads config at host time, fills the cache
//!     ↕
//! Session data (this crate)  ← config, attribute building, result cache
//!     ↕
//! Backend seam (below)  ← AttributeBag, SearchResult types
//! ```

mod config;
mod error;
mod search;
mod settings;

pub use config::SessionConfig;
pub use error::SessionError;
pub use search::SearchResultCache;
pub use settings::build_attributes;
