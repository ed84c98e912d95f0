//! Append-only audit trail of accepted mutations.

use finetrack_core::{Guid, UtcDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::StorageError;
use crate::key_path::KeyPath;
use crate::traits::Store;

const STATISTICS_SEGMENT: &str = "statistics";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsProperties {
    pub previous_state: Option<Value>,
    pub changed_state: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsEvent {
    pub name: String,
    pub timestamp: UtcDate,
    pub properties: StatisticsProperties,
}

/// Writes one event per accepted mutation under
/// `<prefix>/statistics/<name>/<event id>`. Event ids are fresh identifiers,
/// so history is never overwritten.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsRecorder;

impl StatisticsRecorder {
    pub fn new() -> Self {
        Self
    }

    fn events_path(prefix: &KeyPath, name: &str) -> Result<KeyPath, StorageError> {
        prefix.child(STATISTICS_SEGMENT)?.child(name)
    }

    pub fn record<S: Store + ?Sized>(
        &self,
        store: &mut S,
        prefix: &KeyPath,
        name: &str,
        previous: Option<&Value>,
        changed: &Value,
    ) -> Result<(Guid, StatisticsEvent), StorageError> {
        let event = StatisticsEvent {
            name: name.to_string(),
            timestamp: UtcDate::now(),
            properties: StatisticsProperties {
                previous_state: previous.cloned(),
                changed_state: changed.clone(),
            },
        };
        let event_id = Guid::new();
        let path = Self::events_path(prefix, name)?.child(event_id.to_string())?;
        let value =
            serde_json::to_value(&event).map_err(|e| StorageError::Serialization(e.to_string()))?;
        store.set(&path, &value)?;
        debug!(%path, name, "recorded statistics event");
        Ok((event_id, event))
    }

    /// All events recorded for `name`, ordered by their millisecond
    /// timestamp. Events from the same millisecond follow event id order,
    /// not recording order.
    pub fn events<S: Store + ?Sized>(
        &self,
        store: &S,
        prefix: &KeyPath,
        name: &str,
    ) -> Result<Vec<(Guid, StatisticsEvent)>, StorageError> {
        let mut events = store
            .children(&Self::events_path(prefix, name)?)?
            .into_iter()
            .map(|(key, value)| {
                let id = Guid::parse(&key)?;
                let event: StatisticsEvent = serde_json::from_value(value)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok((id, event))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        events.sort_by_key(|(id, event)| (event.timestamp, *id));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;
    use serde_json::json;

    #[test]
    fn each_record_is_a_new_event() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        let prefix = KeyPath::parse("testing/clubs/C")?;
        let recorder = StatisticsRecorder::new();

        let (first_id, _) = recorder.record(&mut store, &prefix, "changeFine", None, &json!({ "n": 1 }))?;
        let (second_id, _) = recorder.record(
            &mut store,
            &prefix,
            "changeFine",
            Some(&json!({ "n": 1 })),
            &json!({ "n": 2 }),
        )?;
        assert_ne!(first_id, second_id);

        let events = recorder.events(&store, &prefix, "changeFine")?;
        assert_eq!(events.len(), 2);
        let ids: Vec<Guid> = events.iter().map(|(id, _)| *id).collect();
        assert!(ids.contains(&first_id) && ids.contains(&second_id));
        assert!(recorder.events(&store, &prefix, "changePerson")?.is_empty());
        Ok(())
    }

    #[test]
    fn same_millisecond_events_follow_id_order() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        let prefix = KeyPath::parse("testing/clubs/C")?;
        let dir = prefix.child("statistics")?.child("changeFine")?;
        let event = |n: i64| {
            json!({
                "name": "changeFine",
                "timestamp": "2011-10-15T10:00:00.000Z",
                "properties": { "previousState": null, "changedState": { "n": n } },
            })
        };
        let low = Guid::from_bytes([0x11; 16]);
        let high = Guid::from_bytes([0xEE; 16]);
        let earlier = Guid::from_bytes([0xFF; 16]);
        store.set(&dir.child(high.to_string())?, &event(1))?;
        store.set(&dir.child(low.to_string())?, &event(2))?;
        let mut older = event(0);
        older["timestamp"] = json!("2011-10-15T09:59:59.999Z");
        store.set(&dir.child(earlier.to_string())?, &older)?;

        let ids: Vec<Guid> = StatisticsRecorder::new()
            .events(&store, &prefix, "changeFine")?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![earlier, low, high]);
        Ok(())
    }

    #[test]
    fn stored_shape() -> Result<(), StorageError> {
        let mut store = SqliteStore::open_in_memory()?;
        let prefix = KeyPath::parse("testing/clubs/C")?;
        let (id, _) = StatisticsRecorder::new().record(&mut store, &prefix, "changeFine", None, &json!({ "deleted": true }))?;

        let stored = store
            .get(&prefix.child("statistics")?.child("changeFine")?.child(id.to_string())?)?
            .expect("event stored");
        assert_eq!(stored["name"], json!("changeFine"));
        assert_eq!(
            stored["properties"],
            json!({ "previousState": null, "changedState": { "deleted": true } })
        );
        assert!(UtcDate::parse(stored["timestamp"].as_str().unwrap()).is_ok());
        Ok(())
    }
}
