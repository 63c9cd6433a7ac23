//! Motofix SDK
//!
//! This crate provides [`MotofixClient`], a single handle that wires the
//! configuration, session storage, authenticated HTTP interceptor, requests
//! service client and throttled reverse geocoder together.
//!
//! # Example
//!
//! ```no_run
//! use motofix_sdk::{ClientConfig, MotofixClient, VerifyOutcome};
//!
//! # async fn example() -> motofix_sdk::MotofixResult<()> {
//! let client = MotofixClient::new(ClientConfig::default())?;
//!
//! // show the cached user immediately, then confirm with the server
//! if let Some(user) = client.restore()?.user() {
//!     println!("Welcome back, {}", user.greeting_name());
//! }
//! if let VerifyOutcome::Expired = client.verify().await {
//!     println!("Please sign in again");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{MotofixClient, MotofixClientBuilder};

// Re-export commonly used types from core
pub use motofix_core::{
    Attachment, AttachmentKind, AuthState, ClientConfig, Coordinates, ErrorClass, Event, EventBus,
    MotofixError, MotofixResult, NewRequest, RequestStatus, Role, ServiceRequest, Session, User,
    VerifyOutcome,
};
