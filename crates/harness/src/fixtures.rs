use serde_json::{json, Value};

use finetrack_core::{FineId, PersonId, PseudoRandom, ReasonTemplateId};

const FIRST_NAMES: [&str; 6] = ["Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald"];
const REASONS: [&str; 4] = ["Late to practice", "Forgot jersey", "Yellow card", "Phone in locker room"];

/// Request payload builder. Identifiers come from a seeded generator so a
/// given seed always yields the same fixtures.
pub struct Fixtures {
    rng: PseudoRandom,
}

impl Fixtures {
    pub fn new(seed: &str) -> Self {
        Self {
            rng: PseudoRandom::new(seed),
        }
    }

    pub fn rng(&mut self) -> &mut PseudoRandom {
        &mut self.rng
    }

    pub fn person_id(&mut self) -> PersonId {
        PersonId::from_guid(self.rng.random_guid())
    }

    pub fn fine_id(&mut self) -> FineId {
        FineId::from_guid(self.rng.random_guid())
    }

    pub fn reason_template_id(&mut self) -> ReasonTemplateId {
        ReasonTemplateId::from_guid(self.rng.random_guid())
    }

    pub fn update_properties(timestamp: &str, person_id: PersonId) -> Value {
        json!({ "timestamp": timestamp, "personId": person_id.to_string() })
    }

    pub fn person(&mut self, id: PersonId, update_properties: Value) -> Value {
        let first = *self.rng.random_element(&FIRST_NAMES).unwrap_or(&"Ada");
        json!({
            "id": id.to_string(),
            "name": { "first": first },
            "updateProperties": update_properties,
        })
    }

    pub fn unpayed_fine(
        &mut self,
        id: FineId,
        person_id: PersonId,
        number: u32,
        update_properties: Value,
    ) -> Value {
        let reason = *self.rng.random_element(&REASONS).unwrap_or(&"Late to practice");
        let amount = self.rng.random_int(1..20) as f64 + 0.5;
        json!({
            "id": id.to_string(),
            "personId": person_id.to_string(),
            "number": number,
            "date": "2011-10-14T10:42:38+0000",
            "payedState": { "state": "unpayed" },
            "fineReason": { "reason": reason, "amount": amount, "importance": "medium" },
            "updateProperties": update_properties,
        })
    }

    pub fn reason_template(&mut self, id: ReasonTemplateId, update_properties: Value) -> Value {
        let reason = *self.rng.random_element(&REASONS).unwrap_or(&"Late to practice");
        json!({
            "id": id.to_string(),
            "reason": reason,
            "amount": 5,
            "importance": "high",
            "updateProperties": update_properties,
        })
    }

    /// Payload of a deletion: only the id and the ordering metadata.
    pub fn deletion(id: impl ToString, update_properties: Value) -> Value {
        json!({ "id": id.to_string(), "updateProperties": update_properties })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_fixtures() {
        let mut a = Fixtures::new("fixtures");
        let mut b = Fixtures::new("fixtures");
        assert_eq!(a.person_id(), b.person_id());
        let props = Fixtures::update_properties("2011-10-15T10:42:38+0000", a.person_id());
        b.person_id();
        let fine_a = a.unpayed_fine(FineId::new(), PersonId::new(), 1, props.clone());
        let fine_b = b.unpayed_fine(FineId::new(), PersonId::new(), 1, props);
        assert_eq!(fine_a["fineReason"], fine_b["fineReason"]);
    }
}
