use finetrack_core::{ClubId, FunctionsError};

/// Caller check performed after validation and before any storage access.
/// Credential verification itself belongs to the transport layer.
pub trait Authorizer {
    fn authorize(&self, operation: &'static str, club_id: ClubId) -> Result<(), FunctionsError>;
}

/// Lets every call through.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _operation: &'static str, _club_id: ClubId) -> Result<(), FunctionsError> {
        Ok(())
    }
}

/// Only admits the listed clubs.
#[derive(Debug, Default, Clone)]
pub struct ClubAllowList {
    clubs: Vec<ClubId>,
}

impl ClubAllowList {
    pub fn new(clubs: impl IntoIterator<Item = ClubId>) -> Self {
        Self {
            clubs: clubs.into_iter().collect(),
        }
    }
}

impl Authorizer for ClubAllowList {
    fn authorize(&self, operation: &'static str, club_id: ClubId) -> Result<(), FunctionsError> {
        if self.clubs.contains(&club_id) {
            return Ok(());
        }
        Err(FunctionsError::permission_denied(format!(
            "Not allowed to call '{operation}' for club '{club_id}'."
        )))
    }
}
