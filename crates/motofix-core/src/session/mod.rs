//! Client-side session cache
//!
//! - [`SessionStore`] owns the persisted token and user record and the in-memory
//!   [`AuthState`]. No other component mutates them.
//! - [`SessionManager`] drives the lifecycle: restore, verify against the auth
//!   service (single-flight, bounded retry), sign in and sign out.

mod manager;
mod store;
mod types;

pub use manager::{SessionManager, VerifyOutcome};
pub use store::SessionStore;
pub use types::{AuthState, Role, Session, User};
