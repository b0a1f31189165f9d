//! WarehouseWriter trait definition.

use super::models::{
    ArtistRecord, SongLookup, SongMatch, SongRecord, SongplayRecord, TimeRecord, UserRecord,
};
use crate::error::{LookupError, WriteError};

/// One write operation per warehouse table.
///
/// Every call is independent: a failed write leaves earlier and later writes
/// of the same unit of work untouched.
pub trait WarehouseWriter {
    /// Inserts a song, keeping the existing row if the id is already known.
    fn write_song(&mut self, song: &SongRecord) -> Result<(), WriteError>;

    /// Inserts an artist, keeping the existing row if the id is already known.
    fn write_artist(&mut self, artist: &ArtistRecord) -> Result<(), WriteError>;

    fn write_time(&mut self, time: &TimeRecord) -> Result<(), WriteError>;

    /// Inserts a user or overwrites the stored one with the same id.
    fn write_user(&mut self, user: &UserRecord) -> Result<(), WriteError>;

    /// Finds the song+artist pair matching title, artist name and duration
    /// exactly. Returns None when nothing matches.
    fn find_song(&mut self, lookup: SongLookup<'_>) -> Result<Option<SongMatch>, LookupError>;

    fn write_songplay(&mut self, songplay: &SongplayRecord) -> Result<(), WriteError>;
}
