mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "sparkify.db";
pub const DEFAULT_SONG_DATA_DIR: &str = "data/song_data";
pub const DEFAULT_LOG_DATA_DIR: &str = "data/log_data";
pub const DEFAULT_EXTENSION: &str = "json";

/// Settings coming from the command line.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub extension: String,
    pub reset: bool,
    pub check_only: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            song_data_dir: PathBuf::from(DEFAULT_SONG_DATA_DIR),
            log_data_dir: PathBuf::from(DEFAULT_LOG_DATA_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            reset: false,
            check_only: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub extension: String,
    /// Drop and recreate the warehouse tables before loading.
    pub reset: bool,
    /// Only discover and parse the input, write nothing.
    pub check_only: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        let song_data_dir = file
            .song_data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data_dir.clone());
        let log_data_dir = file
            .log_data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data_dir.clone());

        let extension = file
            .extension
            .unwrap_or_else(|| cli.extension.clone())
            .trim_start_matches('.')
            .to_string();
        if extension.is_empty() {
            bail!("extension must not be empty");
        }

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        Ok(Self {
            db_path,
            song_data_dir,
            log_data_dir,
            extension,
            reset: cli.reset,
            check_only: cli.check_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn cli_values_used_without_file() {
        let cli = CliConfig {
            reset: true,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_path, PathBuf::from("sparkify.db"));
        assert_eq!(config.song_data_dir, PathBuf::from("data/song_data"));
        assert_eq!(config.log_data_dir, PathBuf::from("data/log_data"));
        assert_eq!(config.extension, "json");
        assert!(config.reset);
        assert!(!config.check_only);
    }

    #[test]
    fn file_values_override_cli() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
db_path = "/tmp/warehouse.db"
log_data_dir = "events"
extension = ".jsonl"
"#
        )
        .unwrap();

        let file_config = FileConfig::load(file.path()).unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/warehouse.db"));
        assert_eq!(config.song_data_dir, PathBuf::from("data/song_data"));
        assert_eq!(config.log_data_dir, PathBuf::from("events"));
        assert_eq!(config.extension, "jsonl");
    }

    #[test]
    fn rejects_directory_as_db_path() {
        let dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: dir.path().to_path_buf(),
            ..Default::default()
        };

        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn rejects_unparseable_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "db_path = ").unwrap();

        assert!(FileConfig::load(file.path()).is_err());
    }
}
