//! Local-user identity tracking for Lobbyforge.
//!
//! A thin layer over a provider's identity capability: request a login,
//! apply its one-shot completion, expose the resulting state. The state is
//! per-backend — a backend switch resets it.

mod error;
mod manager;

pub use error::IdentityError;
pub use manager::{IdentityManager, IdentityState};
