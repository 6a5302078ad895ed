pub mod actions;
pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{LeagueFixture, LeagueFixtureBuilder};
#[allow(unused_imports)]
pub use assertions::{assert_envelope, assert_ranking};
#[allow(unused_imports)]
pub use setup::{TestApp, TestResponse};
