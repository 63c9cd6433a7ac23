//! Breakdown requests service integration

mod attachment;
mod client;
mod types;

pub use attachment::{Attachment, AttachmentKind, MAX_ATTACHMENT_BYTES};
pub use client::RequestsClient;
pub use types::{NewRequest, RequestStatus, ServiceRequest};
