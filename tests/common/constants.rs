//! Test constants shared across the integration tests.

pub const CASUAL_SONG_ID: &str = "SOMZWCG12A8C13C480";
pub const CASUAL_ARTIST_ID: &str = "ARD7TVE1187B99BFB1";
pub const CASUAL_TITLE: &str = "I Didn't Mean To";
pub const CASUAL_ARTIST: &str = "Casual";
pub const CASUAL_DURATION: f64 = 218.93179;

/// 2018-11-03 01:04:33.796 UTC, a Saturday.
pub const TS_SATURDAY: i64 = 1541207073796;
pub const TS_SATURDAY_STORED: &str = "2018-11-03 01:04:33.796";
