//! Client builder

use super::MotofixClient;
use motofix_core::recovery::RetryPolicy;
use motofix_core::{
    ApiClient, AuthClient, ClientConfig, EventBus, FileSessionStorage, MinIntervalLimiter,
    MotofixError, MotofixResult, RequestsClient, ReverseGeocoder, SessionManager, SessionStorage,
    SessionStore,
};
use std::sync::Arc;

/// Builder for [`MotofixClient`]
///
/// Anything not supplied is derived from the configuration: file storage under
/// `session.storage_dir`, a reqwest client with the configured timeout, and a
/// limiter spacing geocoder calls by `geocoder.min_interval`.
#[derive(Default)]
pub struct MotofixClientBuilder {
    config: Option<ClientConfig>,
    storage: Option<Arc<dyn SessionStorage>>,
    http: Option<reqwest::Client>,
    events: Option<EventBus>,
    limiter: Option<Arc<MinIntervalLimiter>>,
}

impl MotofixClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a specific storage backend instead of the configured directory
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Share an event bus with the embedding application
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Share a geocoding limiter between several clients
    pub fn geocode_limiter(mut self, limiter: Arc<MinIntervalLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn build(self) -> MotofixResult<MotofixClient> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let storage: Arc<dyn SessionStorage> = match self.storage {
            Some(storage) => storage,
            None => {
                let dir = config.session.resolved_storage_dir()?;
                Arc::new(FileSessionStorage::open(dir)?)
            }
        };

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(config.http.timeout)
                .user_agent(config.http.user_agent.clone())
                .build()
                .map_err(|e| MotofixError::config(format!("Failed to build HTTP client: {}", e)))?,
        };

        let events = self.events.unwrap_or_default();
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(MinIntervalLimiter::new(config.geocoder.min_interval)));

        let store = Arc::new(SessionStore::new(storage));
        let api = ApiClient::with_http_client(http.clone(), store.clone(), events.clone());
        let auth = AuthClient::new(api.clone(), config.services.auth_url.clone());
        let session = SessionManager::new(
            store,
            auth,
            events.clone(),
            RetryPolicy::fixed(
                config.session.verify_retries,
                config.session.verify_retry_delay,
            ),
            config.session.default_country_code.clone(),
        );
        let requests = RequestsClient::new(api, config.services.requests_url.clone());
        let geocoder = ReverseGeocoder::new(http, &config.geocoder, limiter);

        tracing::debug!(
            auth = %config.services.auth_url,
            requests = %config.services.requests_url,
            "motofix client ready"
        );

        Ok(MotofixClient {
            config,
            events,
            session,
            requests,
            geocoder,
        })
    }
}
