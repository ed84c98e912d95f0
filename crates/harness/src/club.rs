use serde_json::{json, Value};

use finetrack_core::{ClubId, Fine, FineId, FunctionsError, PersonId};
use finetrack_engine::{Engine, EngineError, OperationOutcome, ServiceConfig};
use finetrack_storage::{SqliteStore, StatisticsEvent, Store};

use crate::fixtures::Fixtures;

/// One club on a fresh in-memory testing store.
pub struct TestClub {
    pub engine: Engine<SqliteStore>,
    pub club_id: ClubId,
    pub fixtures: Fixtures,
}

impl TestClub {
    pub fn new(seed: &str) -> Result<Self, EngineError> {
        let mut fixtures = Fixtures::new(seed);
        let club_id = ClubId::from_guid(fixtures.rng().random_guid());
        Ok(Self {
            engine: Engine::open(ServiceConfig::testing())?,
            club_id,
            fixtures,
        })
    }

    pub fn with_engine(engine: Engine<SqliteStore>, seed: &str) -> Self {
        let mut fixtures = Fixtures::new(seed);
        let club_id = ClubId::from_guid(fixtures.rng().random_guid());
        Self {
            engine,
            club_id,
            fixtures,
        }
    }

    /// Store an unpayed fine through `changeFine` and return its id.
    pub fn create_unpayed_fine(
        &mut self,
        number: u32,
        person_id: PersonId,
        timestamp: &str,
    ) -> Result<FineId, FunctionsError> {
        let fine_id = self.fixtures.fine_id();
        let props = Fixtures::update_properties(timestamp, person_id);
        let fine = self.fixtures.unpayed_fine(fine_id, person_id, number, props);
        self.change_fine("update", fine)?;
        Ok(fine_id)
    }

    pub fn change_fine(&mut self, change_type: &str, fine: Value) -> Result<OperationOutcome, FunctionsError> {
        let request = json!({
            "clubId": self.club_id.to_string(),
            "changeType": change_type,
            "fine": fine,
        });
        self.engine.change_fine(&request)
    }

    pub fn delete_fine(
        &mut self,
        fine_id: FineId,
        timestamp: &str,
        person_id: PersonId,
    ) -> Result<OperationOutcome, FunctionsError> {
        let props = Fixtures::update_properties(timestamp, person_id);
        self.change_fine("delete", Fixtures::deletion(fine_id, props))
    }

    pub fn change_payed_state(
        &mut self,
        fine_id: FineId,
        payed_state: Value,
        timestamp: &str,
        person_id: PersonId,
    ) -> Result<OperationOutcome, FunctionsError> {
        let request = json!({
            "clubId": self.club_id.to_string(),
            "fineId": fine_id.to_string(),
            "payedState": payed_state,
            "updateProperties": Fixtures::update_properties(timestamp, person_id),
        });
        self.engine.change_fine_payed_state(&request)
    }

    pub fn stored_fine(&self, fine_id: FineId) -> Result<Option<Value>, FunctionsError> {
        let path = self.engine.entity_path::<Fine>(self.club_id, fine_id)?;
        Ok(self.engine.store().get(&path)?)
    }

    pub fn events(&self, name: &str) -> Result<Vec<StatisticsEvent>, FunctionsError> {
        let club_path = self.engine.club_path(self.club_id)?;
        Ok(self
            .engine
            .recorder()
            .events(self.engine.store(), &club_path, name)?
            .into_iter()
            .map(|(_, event)| event)
            .collect())
    }
}
