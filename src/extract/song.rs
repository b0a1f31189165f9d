use super::{non_empty, read_json_lines, Extracted};
use crate::error::ExtractError;
use crate::warehouse::{ArtistRecord, SongRecord};
use serde::Deserialize;
use std::path::Path;

/// One line of a song data file: a song together with its artist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongLine {
    pub song_id: String,
    pub title: String,
    pub duration: f64,
    #[serde(default)]
    pub year: i32,
    pub artist_id: String,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
}

impl SongLine {
    pub fn split(self) -> (SongRecord, ArtistRecord) {
        let song = SongRecord {
            song_id: self.song_id,
            title: self.title,
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        };
        let artist = ArtistRecord {
            artist_id: self.artist_id,
            name: self.artist_name,
            location: non_empty(self.artist_location),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        };
        (song, artist)
    }
}

pub fn extract_song_file<P: AsRef<Path>>(path: P) -> Result<Extracted<SongLine>, ExtractError> {
    read_json_lines(path.as_ref())
}
