//! Authenticated HTTP plumbing shared by the API clients

mod interceptor;

pub use interceptor::ApiClient;

/// Join a service base URL and an endpoint path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
