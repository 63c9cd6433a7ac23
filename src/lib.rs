//! Motofix client
//!
//! Umbrella crate over [`motofix_sdk`] (the high-level client) and
//! [`motofix_core`] (session, interceptor, requests and geocoding building
//! blocks). The `motofix` binary lives in the `motofix-cli` crate.

pub use motofix_core as core;
pub use motofix_sdk::*;
