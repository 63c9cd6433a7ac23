//! Auth service integration
//!
//! Provides:
//! - One-time code issue and exchange for a bearer token
//! - Token verification ("who am I") and best-effort invalidation
//! - Phone number normalization to E.164

mod client;
mod phone;

pub use client::AuthClient;
pub use phone::{OneTimeCode, PhoneNumber};
