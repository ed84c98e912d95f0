use serde::Serialize;

use crate::error::FunctionsError;
use crate::fine::{parse_amount, Importance};
use crate::ids::ReasonTemplateId;
use crate::parameter::ParameterContainer;
use crate::updatable::Entity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonTemplate {
    pub id: ReasonTemplateId,
    pub reason: String,
    pub amount: f64,
    pub importance: Importance,
}

impl Entity for ReasonTemplate {
    type Id = ReasonTemplateId;
    const NAME: &'static str = "reasonTemplate";
    const COLLECTION: &'static str = "reasonTemplates";

    fn id(&self) -> ReasonTemplateId {
        self.id
    }

    fn from_container(container: &ParameterContainer) -> Result<Self, FunctionsError> {
        Ok(Self {
            id: container.guid("id")?,
            reason: container.string("reason")?.to_string(),
            amount: parse_amount(container, "amount")?,
            importance: container.parse("importance")?,
        })
    }
}
