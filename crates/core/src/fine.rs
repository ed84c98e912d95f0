use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::FunctionsError;
use crate::ids::{FineId, PersonId, ReasonTemplateId};
use crate::parameter::{parse_enum, type_error, FromParameter, ParameterContainer};
use crate::updatable::Entity;
use crate::utc_date::UtcDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayedState {
    Payed { pay_date: UtcDate, in_app: bool },
    Settled,
    Unpayed,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PayedStateKind {
    Payed,
    Settled,
    Unpayed,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PayedStateRepr {
    state: &'static str,
    pay_date: Option<UtcDate>,
    in_app: Option<bool>,
}

impl PayedState {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Payed { .. } => "payed",
            Self::Settled => "settled",
            Self::Unpayed => "unpayed",
        }
    }
}

impl Serialize for PayedState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (pay_date, in_app) = match self {
            Self::Payed { pay_date, in_app } => (Some(*pay_date), Some(*in_app)),
            Self::Settled | Self::Unpayed => (None, None),
        };
        PayedStateRepr {
            state: self.state_name(),
            pay_date,
            in_app,
        }
        .serialize(serializer)
    }
}

impl FromParameter for PayedState {
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        let container = ParameterContainer::from_field(field, value)?;
        let kind = parse_enum(
            "PayedState",
            "state",
            container.raw("state"),
            &[
                ("payed", PayedStateKind::Payed),
                ("settled", PayedStateKind::Settled),
                ("unpayed", PayedStateKind::Unpayed),
            ],
        )?;
        Ok(match kind {
            PayedStateKind::Payed => Self::Payed {
                pay_date: container.date("payDate")?,
                in_app: container.boolean("inApp")?,
            },
            PayedStateKind::Settled => Self::Settled,
            PayedStateKind::Unpayed => Self::Unpayed,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl FromParameter for Importance {
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        parse_enum(
            "Importance",
            field,
            value,
            &[
                ("high", Importance::High),
                ("medium", Importance::Medium),
                ("low", Importance::Low),
            ],
        )
    }
}

/// A positive, finite amount of money.
pub(crate) fn parse_amount(container: &ParameterContainer, field: &str) -> Result<f64, FunctionsError> {
    let amount = container.number(field)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(type_error(field, "positive number", container.raw(field)));
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FineReason {
    Template {
        #[serde(rename = "reasonTemplateId")]
        reason_template_id: ReasonTemplateId,
    },
    Custom {
        reason: String,
        amount: f64,
        importance: Importance,
    },
}

impl FromParameter for FineReason {
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        let container = ParameterContainer::from_field(field, value)?;
        if container.contains("reasonTemplateId") {
            return Ok(Self::Template {
                reason_template_id: container.guid("reasonTemplateId")?,
            });
        }
        Ok(Self::Custom {
            reason: container.string("reason")?.to_string(),
            amount: parse_amount(&container, "amount")?,
            importance: container.parse("importance")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fine {
    pub id: FineId,
    pub person_id: PersonId,
    pub number: u32,
    pub date: UtcDate,
    pub payed_state: PayedState,
    pub fine_reason: FineReason,
}

impl Entity for Fine {
    type Id = FineId;
    const NAME: &'static str = "fine";
    const COLLECTION: &'static str = "fines";

    fn id(&self) -> FineId {
        self.id
    }

    fn from_container(container: &ParameterContainer) -> Result<Self, FunctionsError> {
        let number = container.integer("number")?;
        let number = u32::try_from(number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| type_error("number", "positive integer", container.raw("number")))?;
        Ok(Self {
            id: container.guid("id")?,
            person_id: container.guid("personId")?,
            number,
            date: container.date("date")?,
            payed_state: container.parse("payedState")?,
            fine_reason: container.parse("fineReason")?,
        })
    }
}
