pub mod error;
pub mod fine;
pub mod ids;
pub mod parameter;
pub mod person;
pub mod random;
pub mod reason_template;
pub mod updatable;
pub mod utc_date;

pub use error::{CoreError, ErrorCode, FunctionsError};
pub use fine::{Fine, FineReason, Importance, PayedState};
pub use ids::*;
pub use parameter::{FromParameter, ParameterContainer};
pub use person::{Person, PersonName};
pub use random::PseudoRandom;
pub use reason_template::ReasonTemplate;
pub use updatable::{ChangeType, Entity, Resolution, Updatable, UpdatePolicy, UpdateProperties};
pub use utc_date::UtcDate;
