//! SDK client implementation

mod builder;

pub use builder::MotofixClientBuilder;

use motofix_core::{
    Attachment, AuthState, ClientConfig, Coordinates, Event, EventBus, MotofixResult,
    NewRequest, ReverseGeocoder, RequestsClient, ServiceRequest, SessionManager, User,
    VerifyOutcome,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// High-level client for the Motofix services.
///
/// Owns one session store, one event bus and one geocoding limiter; every
/// component created by the client shares them.
///
/// # Examples
///
/// ```no_run
/// use motofix_sdk::{MotofixClient, NewRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MotofixClient::builder().build()?;
/// client.sign_in("+256700000000", "1234", None).await?;
///
/// let request = NewRequest::new("Okello", "+256700000000", "Jinja Road", "Flat tyre");
/// let created = client.submit_request(&request, Vec::new()).await?;
/// println!("Request {} is {}", created.id, created.status.label());
/// # Ok(())
/// # }
/// ```
pub struct MotofixClient {
    pub(crate) config: ClientConfig,
    pub(crate) events: EventBus,
    pub(crate) session: SessionManager,
    pub(crate) requests: RequestsClient,
    pub(crate) geocoder: ReverseGeocoder,
}

impl MotofixClient {
    /// Start building a client
    pub fn builder() -> MotofixClientBuilder {
        MotofixClientBuilder::new()
    }

    /// Create a client with file-backed session storage
    pub fn new(config: ClientConfig) -> MotofixResult<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn requests(&self) -> &RequestsClient {
        &self.requests
    }

    pub fn geocoder(&self) -> &ReverseGeocoder {
        &self.geocoder
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to session and navigation events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Current authentication state
    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    /// Load the cached session without network
    pub fn restore(&self) -> MotofixResult<AuthState> {
        self.session.restore()
    }

    /// Confirm the cached session with the auth service
    pub async fn verify(&self) -> VerifyOutcome {
        self.session.verify().await
    }

    /// Confirm the cached session, giving up when `cancel` fires
    pub async fn verify_with_cancel(&self, cancel: &CancellationToken) -> VerifyOutcome {
        self.session.verify_with_cancel(cancel).await
    }

    /// Send a one-time code to the given phone number
    pub async fn request_code(&self, phone: &str) -> MotofixResult<String> {
        let phone = self.session.request_code(phone).await?;
        Ok(phone.to_string())
    }

    /// Exchange a one-time code for a persisted session
    pub async fn sign_in(
        &self,
        phone: &str,
        code: &str,
        display_name: Option<&str>,
    ) -> MotofixResult<User> {
        self.session.sign_in(phone, code, display_name).await
    }

    /// Sign out locally, invalidating the token remotely in the background
    pub fn sign_out(&self) -> MotofixResult<Option<JoinHandle<()>>> {
        self.session.sign_out()
    }

    /// Create a request, as multipart when there are attachments
    pub async fn submit_request(
        &self,
        request: &NewRequest,
        attachments: Vec<Attachment>,
    ) -> MotofixResult<ServiceRequest> {
        if attachments.is_empty() {
            self.requests.create_request(request).await
        } else {
            self.requests
                .create_request_with_attachments(request, attachments)
                .await
        }
    }

    /// Address label for a position, falling back to the coordinates
    pub async fn describe_location(&self, coords: Coordinates) -> String {
        self.geocoder.label_for(coords).await
    }
}

impl std::fmt::Debug for MotofixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotofixClient")
            .field("auth_url", &self.config.services.auth_url)
            .field("requests_url", &self.config.services.requests_url)
            .finish_non_exhaustive()
    }
}
