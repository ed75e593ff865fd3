pub mod sqlite;

use crate::app::Result;

pub use sqlite::SqliteStore;

/// Durable storage for small string values under well-known keys.
///
/// Used both as the credential store and as the home of the pending
/// submission blob. Writes must be durable before the call returns.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
