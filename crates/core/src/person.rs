use serde::Serialize;
use serde_json::Value;

use crate::error::FunctionsError;
use crate::ids::PersonId;
use crate::parameter::{FromParameter, ParameterContainer};
use crate::updatable::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonName {
    pub first: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

impl FromParameter for PersonName {
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        let container = ParameterContainer::from_field(field, value)?;
        Ok(Self {
            first: container.string("first")?.to_string(),
            last: container.optional_string("last")?.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: PersonName,
}

impl Entity for Person {
    type Id = PersonId;
    const NAME: &'static str = "person";
    const COLLECTION: &'static str = "persons";

    fn id(&self) -> PersonId {
        self.id
    }

    fn from_container(container: &ParameterContainer) -> Result<Self, FunctionsError> {
        Ok(Self {
            id: container.guid("id")?,
            name: container.parse("name")?,
        })
    }
}
