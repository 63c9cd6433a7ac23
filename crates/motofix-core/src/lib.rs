//! Motofix Core Library
//!
//! This crate provides the building blocks of the Motofix client: the persisted
//! session cache and its verification, the authenticated HTTP interceptor, the
//! auth and requests service clients, and the throttled reverse geocoder.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod geocode;
pub mod http;
pub mod recovery;
pub mod requests;
pub mod session;
pub mod storage;

mod utils;

// Re-export commonly used types
pub use auth::{AuthClient, PhoneNumber};
pub use config::ClientConfig;
pub use error::{ErrorClass, MotofixError, MotofixResult};
pub use events::{Event, EventBus};
pub use geocode::{Coordinates, MinIntervalLimiter, ReverseGeocoder};
pub use http::ApiClient;
pub use requests::{
    Attachment, AttachmentKind, NewRequest, RequestStatus, RequestsClient, ServiceRequest,
};
pub use session::{AuthState, Role, Session, SessionManager, SessionStore, User, VerifyOutcome};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
