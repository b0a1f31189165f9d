//! Derivation of warehouse rows from log events.

use crate::extract::LogEvent;
use crate::warehouse::{SongLookup, SongplayRecord, TimeRecord, UserRecord};
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Keeps only playback events of logged in users, in file order.
pub fn playable_events(events: Vec<LogEvent>) -> Vec<LogEvent> {
    events
        .into_iter()
        .filter(|event| event.has_user() && event.is_next_song())
        .collect()
}

/// Converts a millisecond epoch timestamp into a UTC instant.
/// Returns None for timestamps chrono cannot represent.
pub fn start_time(ts_millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts_millis)
}

pub fn time_record(start_time: DateTime<Utc>) -> TimeRecord {
    let weekday = start_time.weekday().num_days_from_monday();
    TimeRecord {
        start_time,
        hour: start_time.hour(),
        day: start_time.day(),
        week: weekday,
        month: start_time.month(),
        year: start_time.year(),
        weekday,
    }
}

pub fn user_record(event: &LogEvent) -> UserRecord {
    UserRecord {
        user_id: event.user_id.clone(),
        first_name: event.first_name.clone(),
        last_name: event.last_name.clone(),
        gender: event.gender.clone(),
        level: event.level.clone(),
    }
}

/// Lookup keys of a playback event, None if the event lacks any of them.
pub fn song_lookup(event: &LogEvent) -> Option<SongLookup<'_>> {
    Some(SongLookup {
        title: event.song.as_deref()?,
        artist_name: event.artist.as_deref()?,
        duration: event.length?,
    })
}

/// Builds the songplay row. Song and artist ids are left empty, they are
/// resolved against the warehouse at write time.
pub fn songplay_record(event: &LogEvent, start_time: DateTime<Utc>) -> SongplayRecord {
    SongplayRecord {
        start_time,
        user_id: event.user_id.clone(),
        level: event.level.clone(),
        song_id: None,
        artist_id: None,
        session_id: event.session_id,
        location: event.location.clone(),
        user_agent: event.user_agent.clone(),
    }
}
