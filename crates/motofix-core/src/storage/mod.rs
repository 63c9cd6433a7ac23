//! Persistent key/value storage backing the session cache
//!
//! The session store keeps exactly two entries, [`TOKEN_KEY`] and [`USER_KEY`].
//! Backends are synchronous: values are small and access is infrequent.

mod file;
mod memory;

pub use file::FileSessionStorage;
pub use memory::MemorySessionStorage;

use crate::error::MotofixResult;

/// Key under which the bearer token is stored
pub const TOKEN_KEY: &str = "token";

/// Key under which the serialized user record is stored
pub const USER_KEY: &str = "user";

/// Storage interface for persisted session values
pub trait SessionStorage: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> MotofixResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> MotofixResult<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> MotofixResult<()>;
}
