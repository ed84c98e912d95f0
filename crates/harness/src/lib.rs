pub mod club;
pub mod fixtures;

pub use club::TestClub;
pub use fixtures::Fixtures;
