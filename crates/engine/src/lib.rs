pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

pub use auth::{AllowAll, Authorizer, ClubAllowList};
pub use config::{DatabaseType, ServiceConfig};
pub use error::EngineError;

use serde_json::Value;
use tracing::{debug, info, info_span};

use finetrack_core::{
    ChangeType, ClubId, Entity, Fine, FineId, FunctionsError, ParameterContainer, PayedState,
    Person, ReasonTemplate, Resolution, Updatable, UpdatePolicy, UpdateProperties,
};
use finetrack_storage::{KeyPath, SqliteStore, StatisticsRecorder, Store};

const CLUBS_SEGMENT: &str = "clubs";

/// Result of an accepted request. A discarded update still counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    Applied,
    Discarded,
}

/// Value read at a key path together with its parsed form.
struct StoredEntity<T: Entity> {
    raw: Value,
    updatable: Updatable<T>,
}

pub struct Engine<S: Store = SqliteStore> {
    config: ServiceConfig,
    store: S,
    recorder: StatisticsRecorder,
    authorizer: Box<dyn Authorizer>,
}

impl Engine<SqliteStore> {
    /// Open the SQLite store named by the configuration.
    pub fn open(config: ServiceConfig) -> Result<Self, EngineError> {
        let store = if config.is_in_memory() {
            SqliteStore::open_in_memory()?
        } else {
            SqliteStore::open(&config.database_path)?
        };
        info!(
            database_type = config.database_type.root_segment(),
            database_path = %config.database_path,
            "opened store"
        );
        Ok(Self::with_store(config, store))
    }
}

impl<S: Store> Engine<S> {
    pub fn with_store(config: ServiceConfig, store: S) -> Self {
        Self {
            config,
            store,
            recorder: StatisticsRecorder::new(),
            authorizer: Box::new(AllowAll),
        }
    }

    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Box::new(authorizer);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn recorder(&self) -> &StatisticsRecorder {
        &self.recorder
    }

    pub fn club_path(&self, club_id: ClubId) -> Result<KeyPath, FunctionsError> {
        Ok(KeyPath::new([
            self.config.database_type.root_segment(),
            CLUBS_SEGMENT,
        ])?
        .child(club_id.to_string())?)
    }

    pub fn entity_path<T: Entity>(&self, club_id: ClubId, id: T::Id) -> Result<KeyPath, FunctionsError> {
        Ok(self
            .club_path(club_id)?
            .child(T::COLLECTION)?
            .child(id.to_string())?)
    }

    fn read<T: Entity>(&self, path: &KeyPath, id: T::Id) -> Result<Option<StoredEntity<T>>, FunctionsError> {
        let Some(raw) = self.store.get(path)? else {
            return Ok(None);
        };
        let updatable = Updatable::from_stored(id, &raw).map_err(|e| {
            FunctionsError::internal(format!("Couldn't read stored {} at '{path}': {}", T::NAME, e.message))
        })?;
        Ok(Some(StoredEntity { raw, updatable }))
    }

    /// Read an entity that must exist and not be deleted.
    fn read_active<T: Entity>(
        &self,
        path: &KeyPath,
        id: T::Id,
    ) -> Result<StoredEntity<T>, FunctionsError> {
        let stored = self.read::<T>(path, id)?.ok_or_else(|| {
            FunctionsError::unavailable(format!("Couldn't get {} from 'Absent'.", T::NAME))
        })?;
        stored.updatable.require_active()?;
        Ok(stored)
    }

    /// Read, decide, write, record. The statistics event is written only when
    /// the incoming state is accepted.
    fn apply<T: Entity>(
        &mut self,
        operation: &'static str,
        club_id: ClubId,
        current: Option<StoredEntity<T>>,
        incoming: Updatable<T>,
        policy: UpdatePolicy,
    ) -> Result<OperationOutcome, FunctionsError> {
        let path = self.entity_path::<T>(club_id, incoming.id())?;
        let (previous_raw, current) = match current {
            Some(StoredEntity { raw, updatable }) => (Some(raw), Some(updatable)),
            None => (None, None),
        };

        let next = match policy.decide(current, incoming)? {
            Resolution::Stale { current, incoming } => {
                info!(
                    %path,
                    stored = ?current.properties(),
                    incoming = ?incoming.properties(),
                    "discarded stale update"
                );
                return Ok(OperationOutcome::Discarded);
            }
            Resolution::Accepted { next, .. } => next,
        };

        let next_raw = next.to_stored()?;
        self.store.set(&path, &next_raw)?;
        let club_path = self.club_path(club_id)?;
        self.recorder.record(
            &mut self.store,
            &club_path,
            operation,
            previous_raw.as_ref(),
            &next_raw,
        )?;
        debug!(%path, deleted = next.is_deleted(), "applied update");
        Ok(OperationOutcome::Applied)
    }

    /// Shared shape of the `change*` operations: `clubId`, `changeType` and the
    /// updatable entity under `field`, resolved last-writer-wins.
    fn change_entity<T: Entity>(
        &mut self,
        operation: &'static str,
        field: &str,
        request: &Value,
    ) -> Result<OperationOutcome, FunctionsError> {
        let params = ParameterContainer::from_value(request)?;
        let club_id: ClubId = params.guid("clubId")?;
        let change_type: ChangeType = params.parse("changeType")?;
        let incoming = Updatable::<T>::from_request(field, params.raw(field), change_type)?;

        let _span = info_span!("operation", operation, club_id = %club_id, id = %incoming.id()).entered();
        self.authorizer.authorize(operation, club_id)?;

        let path = self.entity_path::<T>(club_id, incoming.id())?;
        let current = self.read::<T>(&path, incoming.id())?;
        self.apply(operation, club_id, current, incoming, UpdatePolicy::LastWriterWins)
    }

    /// `{ clubId, changeType, fine }`
    pub fn change_fine(&mut self, request: &Value) -> Result<OperationOutcome, FunctionsError> {
        self.change_entity::<Fine>("changeFine", "fine", request)
    }

    /// `{ clubId, changeType, person }`
    pub fn change_person(&mut self, request: &Value) -> Result<OperationOutcome, FunctionsError> {
        self.change_entity::<Person>("changePerson", "person", request)
    }

    /// `{ clubId, changeType, reasonTemplate }`
    pub fn change_reason_template(
        &mut self,
        request: &Value,
    ) -> Result<OperationOutcome, FunctionsError> {
        self.change_entity::<ReasonTemplate>("changeReasonTemplate", "reasonTemplate", request)
    }

    /// `{ clubId, fine }`. Fails with `already-exists` if anything, including a
    /// tombstone, is stored under the fine's id.
    pub fn add_fine(&mut self, request: &Value) -> Result<OperationOutcome, FunctionsError> {
        const OPERATION: &str = "addFine";
        let params = ParameterContainer::from_value(request)?;
        let club_id: ClubId = params.guid("clubId")?;
        let incoming = Updatable::<Fine>::from_request("fine", params.raw("fine"), ChangeType::Update)?;

        let _span = info_span!("operation", operation = OPERATION, club_id = %club_id, id = %incoming.id()).entered();
        self.authorizer.authorize(OPERATION, club_id)?;

        let path = self.entity_path::<Fine>(club_id, incoming.id())?;
        let current = self.read::<Fine>(&path, incoming.id())?;
        self.apply(
            OPERATION,
            club_id,
            current,
            incoming,
            UpdatePolicy::Strict { expected: None },
        )
    }

    /// `{ clubId, fineId, payedState, updateProperties }`. The fine must be
    /// active; the rest of it is kept as stored.
    pub fn change_fine_payed_state(
        &mut self,
        request: &Value,
    ) -> Result<OperationOutcome, FunctionsError> {
        const OPERATION: &str = "changeFinePayed";
        let params = ParameterContainer::from_value(request)?;
        let club_id: ClubId = params.guid("clubId")?;
        let fine_id: FineId = params.guid("fineId")?;
        let payed_state: PayedState = params.parse("payedState")?;
        let properties: UpdateProperties = params.parse("updateProperties")?;

        let _span = info_span!("operation", operation = OPERATION, club_id = %club_id, id = %fine_id).entered();
        self.authorizer.authorize(OPERATION, club_id)?;

        let path = self.entity_path::<Fine>(club_id, fine_id)?;
        let current = self.read_active::<Fine>(&path, fine_id)?;
        let incoming = current.updatable.map_active(properties, |fine| Fine {
            payed_state,
            ..fine.clone()
        })?;
        self.apply(
            OPERATION,
            club_id,
            Some(current),
            incoming,
            UpdatePolicy::LastWriterWins,
        )
    }

    /// `{ clubId, fineId }`
    pub fn get_fine(&self, request: &Value) -> Result<Fine, FunctionsError> {
        const OPERATION: &str = "getFine";
        let params = ParameterContainer::from_value(request)?;
        let club_id: ClubId = params.guid("clubId")?;
        let fine_id: FineId = params.guid("fineId")?;

        let _span = info_span!("operation", operation = OPERATION, club_id = %club_id, id = %fine_id).entered();
        self.authorizer.authorize(OPERATION, club_id)?;

        let path = self.entity_path::<Fine>(club_id, fine_id)?;
        let stored = self.read_active::<Fine>(&path, fine_id)?;
        Ok(stored.updatable.require_active()?.clone())
    }

    /// The stored state of an entity, tombstones included.
    pub fn stored<T: Entity>(
        &self,
        club_id: ClubId,
        id: T::Id,
    ) -> Result<Option<Updatable<T>>, FunctionsError> {
        let path = self.entity_path::<T>(club_id, id)?;
        Ok(self.read::<T>(&path, id)?.map(|stored| stored.updatable))
    }
}
