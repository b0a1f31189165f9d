//! Null warehouse writer.
//!
//! Accepts every write and never finds a song. Used to run extraction and
//! transformation over the data without touching a database.

use super::models::{
    ArtistRecord, SongLookup, SongMatch, SongRecord, SongplayRecord, TimeRecord, UserRecord,
};
use super::trait_def::WarehouseWriter;
use crate::error::{LookupError, WriteError};

pub struct NullWarehouseWriter;

impl WarehouseWriter for NullWarehouseWriter {
    fn write_song(&mut self, _song: &SongRecord) -> Result<(), WriteError> {
        Ok(())
    }

    fn write_artist(&mut self, _artist: &ArtistRecord) -> Result<(), WriteError> {
        Ok(())
    }

    fn write_time(&mut self, _time: &TimeRecord) -> Result<(), WriteError> {
        Ok(())
    }

    fn write_user(&mut self, _user: &UserRecord) -> Result<(), WriteError> {
        Ok(())
    }

    fn find_song(&mut self, _lookup: SongLookup<'_>) -> Result<Option<SongMatch>, LookupError> {
        Ok(None)
    }

    fn write_songplay(&mut self, _songplay: &SongplayRecord) -> Result<(), WriteError> {
        Ok(())
    }
}
