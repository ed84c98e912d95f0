use serde_json::{json, Value};

use finetrack_core::{ClubId, ErrorCode, Fine, Updatable};
use finetrack_engine::{Engine, ServiceConfig};
use finetrack_harness::Fixtures;
use finetrack_storage::{KeyPath, SqliteStore, StorageError, Store};

/// Store whose writes below any `statistics` segment fail.
struct NoStatistics(SqliteStore);

impl Store for NoStatistics {
    fn get(&self, path: &KeyPath) -> Result<Option<Value>, StorageError> {
        self.0.get(path)
    }

    fn set(&mut self, path: &KeyPath, value: &Value) -> Result<(), StorageError> {
        if path.segments().iter().any(|segment| segment == "statistics") {
            return Err(StorageError::Serialization(format!("refusing write to '{path}'")));
        }
        self.0.set(path, value)
    }

    fn remove(&mut self, path: &KeyPath) -> Result<(), StorageError> {
        self.0.remove(path)
    }

    fn children(&self, path: &KeyPath) -> Result<Vec<(String, Value)>, StorageError> {
        self.0.children(path)
    }
}

#[test]
fn failed_event_write_is_internal_and_keeps_entity() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::with_store(
        ServiceConfig::testing(),
        NoStatistics(SqliteStore::open_in_memory()?),
    );
    let mut fixtures = Fixtures::new("audit-failure");
    let club_id = ClubId::from_guid(fixtures.rng().random_guid());
    let person = fixtures.person_id();
    let fine_id = fixtures.fine_id();
    let props = Fixtures::update_properties("2011-10-15T10:00:00Z", person);
    let fine = fixtures.unpayed_fine(fine_id, person, 6, props);
    let request = json!({ "clubId": club_id.to_string(), "changeType": "update", "fine": fine });

    let err = engine.change_fine(&request).unwrap_err();
    assert_eq!(err.code, ErrorCode::Internal);

    let stored: Option<Updatable<Fine>> = engine.stored(club_id, fine_id)?;
    assert_eq!(stored.expect("entity write kept").require_active()?.number, 6);

    let club_path = engine.club_path(club_id)?;
    assert!(engine.recorder().events(engine.store(), &club_path, "changeFine")?.is_empty());
    Ok(())
}
