//! Last-writer-wins wrapper for stored entities.
//!
//! Every stored entity is an [`Updatable`]: either an active value or a
//! tombstone, both carrying the [`UpdateProperties`] of the write that produced
//! them. A write supersedes the stored state only when its properties are
//! strictly greater under `(timestamp, person_id)`; equal timestamps fall back
//! to the canonical string order of the acting person's id, so the merge result
//! does not depend on arrival order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, FunctionsError};
use crate::ids::{Guid, PersonId};
use crate::parameter::{parse_enum, FromParameter, ParameterContainer};
use crate::utc_date::UtcDate;

const UPDATE_PROPERTIES_KEY: &str = "updateProperties";
const DELETED_KEY: &str = "deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProperties {
    pub timestamp: UtcDate,
    pub person_id: PersonId,
}

impl UpdateProperties {
    pub fn new(timestamp: UtcDate, person_id: PersonId) -> Self {
        Self {
            timestamp,
            person_id,
        }
    }

    /// Whether a write carrying `self` replaces state written with `other`.
    pub fn supersedes(&self, other: &UpdateProperties) -> bool {
        self > other
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "timestamp": self.timestamp.to_iso_string(),
            "personId": self.person_id.to_string(),
        })
    }
}

impl Ord for UpdateProperties {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.person_id.cmp(&other.person_id))
    }
}

impl PartialOrd for UpdateProperties {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromParameter for UpdateProperties {
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        let container = ParameterContainer::from_field(field, value)?;
        Ok(Self {
            timestamp: container.date("timestamp")?,
            person_id: container.guid("personId")?,
        })
    }
}

/// Whether a request writes a new value or deletes the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Update,
    Delete,
}

impl FromParameter for ChangeType {
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        parse_enum(
            "ChangeType",
            field,
            value,
            &[("update", ChangeType::Update), ("delete", ChangeType::Delete)],
        )
    }
}

/// A domain object stored at its own key path.
pub trait Entity: Serialize + Sized {
    type Id: Copy + Eq + fmt::Debug + fmt::Display + From<Guid>;

    /// Name used in messages, e.g. `fine`.
    const NAME: &'static str;

    /// Key path segment holding all entities of this kind, e.g. `fines`.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Parse the entity's own fields, ignoring `updateProperties`.
    fn from_container(container: &ParameterContainer) -> Result<Self, FunctionsError>;

    fn to_fields(&self) -> Result<Map<String, Value>, CoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(CoreError::Serialization(format!(
                "{} serialized to a non-object: {other}",
                Self::NAME
            ))),
            Err(e) => Err(CoreError::Serialization(e.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Updatable<T: Entity> {
    Active {
        value: T,
        properties: UpdateProperties,
    },
    Tombstone {
        id: T::Id,
        properties: UpdateProperties,
    },
}

impl<T: Entity> Updatable<T> {
    pub fn active(value: T, properties: UpdateProperties) -> Self {
        Self::Active { value, properties }
    }

    pub fn tombstone(id: T::Id, properties: UpdateProperties) -> Self {
        Self::Tombstone { id, properties }
    }

    pub fn id(&self) -> T::Id {
        match self {
            Self::Active { value, .. } => value.id(),
            Self::Tombstone { id, .. } => *id,
        }
    }

    pub fn properties(&self) -> &UpdateProperties {
        match self {
            Self::Active { properties, .. } | Self::Tombstone { properties, .. } => properties,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Tombstone { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Active { value, .. } => Some(value),
            Self::Tombstone { .. } => None,
        }
    }

    /// The active value, or `unavailable` for a tombstone.
    pub fn require_active(&self) -> Result<&T, FunctionsError> {
        self.value().ok_or_else(|| {
            FunctionsError::unavailable(format!("Couldn't get {} from 'Deleted'.", T::NAME))
        })
    }

    /// Replace the active value, keeping this variant's id. A tombstone stays
    /// unavailable.
    pub fn map_active(
        &self,
        properties: UpdateProperties,
        f: impl FnOnce(&T) -> T,
    ) -> Result<Self, FunctionsError> {
        let value = self.require_active()?;
        Ok(Self::active(f(value), properties))
    }

    /// Shape written at the entity's key path.
    pub fn to_stored(&self) -> Result<Value, CoreError> {
        let mut map = match self {
            Self::Active { value, .. } => value.to_fields()?,
            Self::Tombstone { .. } => {
                let mut map = Map::new();
                map.insert(DELETED_KEY.to_string(), Value::Bool(true));
                map
            }
        };
        map.insert(
            UPDATE_PROPERTIES_KEY.to_string(),
            self.properties().to_value(),
        );
        Ok(Value::Object(map))
    }

    /// Read back what [`Updatable::to_stored`] wrote at the key of `id`.
    pub fn from_stored(id: T::Id, stored: &Value) -> Result<Self, FunctionsError> {
        let container = ParameterContainer::from_field(T::NAME, Some(stored))?;
        let properties = container.parse(UPDATE_PROPERTIES_KEY)?;
        if container.optional_boolean(DELETED_KEY)? == Some(true) {
            return Ok(Self::tombstone(id, properties));
        }
        Ok(Self::active(T::from_container(&container)?, properties))
    }

    /// Parse a request field. Deletions only need `id` and `updateProperties`.
    pub fn from_request(
        field: &str,
        value: Option<&Value>,
        change_type: ChangeType,
    ) -> Result<Self, FunctionsError> {
        let container = ParameterContainer::from_field(field, value)?;
        let properties = container.parse(UPDATE_PROPERTIES_KEY)?;
        match change_type {
            ChangeType::Update => Ok(Self::active(T::from_container(&container)?, properties)),
            ChangeType::Delete => Ok(Self::tombstone(container.guid("id")?, properties)),
        }
    }

    /// Decide whether `incoming` replaces `current`.
    pub fn resolve(current: Option<Self>, incoming: Self) -> Resolution<T> {
        match current {
            None => Resolution::Accepted {
                previous: None,
                next: incoming,
            },
            Some(current) if incoming.properties().supersedes(current.properties()) => {
                Resolution::Accepted {
                    previous: Some(current),
                    next: incoming,
                }
            }
            Some(current) => Resolution::Stale { current, incoming },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T: Entity> {
    Accepted {
        previous: Option<Updatable<T>>,
        next: Updatable<T>,
    },
    Stale {
        current: Updatable<T>,
        incoming: Updatable<T>,
    },
}

impl<T: Entity> Resolution<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// How an operation treats an update that doesn't supersede the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Stale updates are dropped and still reported as success.
    LastWriterWins,
    /// The stored state must carry `expected` properties (`None` for absent);
    /// anything else is a conflict.
    Strict { expected: Option<UpdateProperties> },
}

impl UpdatePolicy {
    pub fn decide<T: Entity>(
        self,
        current: Option<Updatable<T>>,
        incoming: Updatable<T>,
    ) -> Result<Resolution<T>, FunctionsError> {
        if let UpdatePolicy::Strict { expected } = self {
            let stored = current.as_ref().map(|c| *c.properties());
            if stored != expected {
                return Err(FunctionsError::already_exists(format!(
                    "Couldn't change {} '{}', stored state doesn't match the expected state.",
                    T::NAME,
                    incoming.id(),
                )));
            }
        }
        let resolution = Updatable::resolve(current, incoming);
        if let (UpdatePolicy::Strict { .. }, Resolution::Stale { incoming, .. }) = (self, &resolution) {
            return Err(FunctionsError::already_exists(format!(
                "Couldn't change {} '{}', a newer change is already stored.",
                T::NAME,
                incoming.id(),
            )));
        }
        Ok(resolution)
    }
}
