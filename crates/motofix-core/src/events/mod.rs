//! Client-wide event bus
//!
//! Components publish session and navigation events here instead of acting on
//! the UI directly. A front-end (the CLI router, or an embedding app) subscribes
//! and decides how to react, e.g. by returning the user to the sign-in screen.

use tokio::sync::broadcast;

/// Route the interceptor sends users to after a rejected credential
pub const LOGIN_ROUTE: &str = "/login";

/// Events emitted by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A session was established through the credential exchange
    SignedIn { user_id: String },

    /// The user signed out locally
    SignedOut,

    /// The cached session was confirmed by the verification endpoint
    SessionVerified { user_id: String },

    /// The server rejected the stored credential; the cache has been cleared
    SessionExpired,

    /// The front-end should navigate to `route`
    Navigate { route: String },

    /// Something worth telling the user about that needs no action
    Notice { message: String },
}

impl Event {
    /// Navigation to the sign-in screen
    pub fn navigate_to_login() -> Self {
        Self::Navigate {
            route: LOGIN_ROUTE.to_string(),
        }
    }

    /// Create a notice event
    pub fn notice(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut => "signed_out",
            Self::SessionVerified { .. } => "session_verified",
            Self::SessionExpired => "session_expired",
            Self::Navigate { .. } => "navigate",
            Self::Notice { .. } => "notice",
        }
    }
}

/// Broadcast-based event bus
///
/// Every subscriber receives a copy of every event published after it subscribed.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus buffering up to `capacity` events per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event, returning the number of subscribers that will see it
    pub fn publish(&self, event: Event) -> usize {
        tracing::trace!(event = event.event_type(), "publishing event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
