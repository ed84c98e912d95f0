use serde_json::Value;

use crate::error::StorageError;
use crate::key_path::KeyPath;

/// The remote data store, reduced to key-path primitives.
///
/// Implementations must make a `get` followed by a `set` on the same path
/// effectively atomic for one caller; the engine holds the store exclusively
/// for the duration of an operation.
pub trait Store {
    fn get(&self, path: &KeyPath) -> Result<Option<Value>, StorageError>;

    fn set(&mut self, path: &KeyPath, value: &Value) -> Result<(), StorageError>;

    /// Remove the value at `path` and everything below it.
    fn remove(&mut self, path: &KeyPath) -> Result<(), StorageError>;

    /// Direct children of `path` as `(name, value)`, ordered by name.
    fn children(&self, path: &KeyPath) -> Result<Vec<(String, Value)>, StorageError>;
}
