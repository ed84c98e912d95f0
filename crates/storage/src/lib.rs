pub mod error;
pub mod key_path;
pub mod schema;
pub mod sqlite;
pub mod statistics;
pub mod traits;

pub use error::StorageError;
pub use key_path::KeyPath;
pub use sqlite::SqliteStore;
pub use statistics::{StatisticsEvent, StatisticsProperties, StatisticsRecorder};
pub use traits::*;
