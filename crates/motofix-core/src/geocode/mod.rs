//! Reverse geocoding for display-only address labels
//!
//! The third-party provider allows about one request per second, so every
//! outbound call goes through a [`MinIntervalLimiter`] shared by all callers.

mod geocoder;
mod throttle;

pub use geocoder::{Coordinates, ReverseGeocoder};
pub use throttle::MinIntervalLimiter;
