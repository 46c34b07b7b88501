use crate::foundation::utils::to_pretty_json;
use config::{ConfigError, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Text written into sidecar files when none is given.
pub const DEFAULT_SIDECAR_TEXT: &str = "No Lyrics.";

/// Contents of `ammg_config.json`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub token: String,
}

/// Loads the stored configuration.
///
/// Values come from the JSON config file, when present, overridden by
/// `AMMG_`-prefixed environment variables (`AMMG_TOKEN`). A file that cannot
/// be parsed is reported and treated as empty.
///
/// # Arguments
///
/// * `cfg_file` - Path of the JSON config file.
///
pub fn load_app_config(cfg_file: &Path) -> AppConfig {
    match get_configuration(cfg_file) {
        Ok(app_config) => app_config,
        Err(e) => {
            log::warn!("Ignoring config file {}: {}", cfg_file.display(), e);
            AppConfig::default()
        }
    }
}

fn get_configuration(cfg_file: &Path) -> Result<AppConfig, ConfigError> {
    let settings = config::Config::builder()
        .add_source(
            config::File::from(cfg_file)
                .format(FileFormat::Json)
                .required(false),
        )
        .add_source(config::Environment::with_prefix("AMMG"))
        .build()?;

    settings.try_deserialize::<AppConfig>()
}

/// Writes the configuration as four-space indented JSON, creating the parent
/// directory if needed.
pub fn save_app_config(cfg_file: &Path, app_config: &AppConfig) -> io::Result<()> {
    if let Some(parent) = cfg_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let content =
        to_pretty_json(app_config).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(cfg_file, content)
}

/// Locations of the config file and the cache, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub cache_dir: PathBuf,
}

impl ConfigFolder {
    /// Uses the platform's config and cache directories, or `ammg_config` and
    /// `ammg_cache` in the working directory where the platform has none.
    pub fn new() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let config_dir = dirs::config_dir()
            .map(|dir| dir.join("ammg"))
            .unwrap_or_else(|| cwd.join("ammg_config"));
        let cache_dir = dirs::cache_dir()
            .map(|dir| dir.join("ammg"))
            .unwrap_or_else(|| cwd.join("ammg_cache"));

        Self::with_dirs(config_dir, cache_dir)
    }

    pub fn with_dirs(config_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            config_file: get_config_file_name(&config_dir),
            config_dir,
            cache_dir,
        }
    }

    pub fn create_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(&self.cache_dir)
    }
}

impl Default for ConfigFolder {
    fn default() -> Self {
        Self::new()
    }
}

fn get_config_file_name(config_dir: &Path) -> PathBuf {
    config_dir.join("ammg_config.json")
}

/// Optional sidecar files written next to every organized track. `None`
/// disables the file, otherwise it holds the text to write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidecarOptions {
    pub lrc: Option<String>,
    pub txt: Option<String>,
}

/// Everything the `get` command needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct GetOptions {
    pub directory: PathBuf,
    pub album_id: String,
    pub output_directory: PathBuf,
    pub storefront: String,
    /// Track numbers to process; all tracks when `None`.
    pub tracks: Option<Vec<u32>>,
    pub clean_request: bool,
    pub cover_width: u32,
    pub cover_height: u32,
    pub check_token: bool,
    /// Accepted difference between catalog and file durations, in seconds.
    pub duration_tolerance: u64,
    pub sidecars: SidecarOptions,
}

impl GetOptions {
    pub fn new(directory: PathBuf, album_id: &str, output_directory: PathBuf) -> Self {
        Self {
            directory,
            album_id: album_id.to_string(),
            output_directory,
            storefront: "us".to_string(),
            tracks: None,
            clean_request: false,
            cover_width: 500,
            cover_height: 500,
            check_token: true,
            duration_tolerance: 5,
            sidecars: SidecarOptions::default(),
        }
    }

    pub fn wants_track(&self, track_number: u32) -> bool {
        self.tracks
            .as_ref()
            .map(|tracks| tracks.contains(&track_number))
            .unwrap_or(true)
    }
}

/// The mutually exclusive actions of the `cache` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheAction {
    Size,
    Path,
    Clean { dry_run: bool },
    /// `--dry-run` given without `--clean-cache`.
    DryRunHint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_folder_layout() {
        let folder = ConfigFolder::with_dirs(PathBuf::from("/c/ammg"), PathBuf::from("/k/ammg"));
        assert_eq!(folder.config_file, PathBuf::from("/c/ammg/ammg_config.json"));
        assert_eq!(folder.cache_dir, PathBuf::from("/k/ammg"));
    }

    #[test]
    fn test_create_dirs() {
        let temp_dir = tempdir().unwrap();
        let folder = ConfigFolder::with_dirs(
            temp_dir.path().join("config"),
            temp_dir.path().join("cache"),
        );

        folder.create_dirs().unwrap();
        assert!(folder.config_dir.is_dir());
        assert!(folder.cache_dir.is_dir());
    }

    #[test]
    fn test_save_and_load_app_config() {
        let temp_dir = tempdir().unwrap();
        let cfg_file = temp_dir.path().join("nested").join("ammg_config.json");

        let app_config = AppConfig {
            token: "abc".to_string(),
        };
        save_app_config(&cfg_file, &app_config).unwrap();

        assert_eq!(
            fs::read_to_string(&cfg_file).unwrap(),
            "{\n    \"token\": \"abc\"\n}\n"
        );
        assert_eq!(load_app_config(&cfg_file), app_config);
    }

    #[test]
    fn test_missing_config_has_no_token() {
        let temp_dir = tempdir().unwrap();
        let app_config = load_app_config(&temp_dir.path().join("ammg_config.json"));
        assert_eq!(app_config.token, "");
    }

    #[test]
    fn test_malformed_config_has_no_token() {
        let temp_dir = tempdir().unwrap();
        let cfg_file = temp_dir.path().join("ammg_config.json");
        fs::write(&cfg_file, "{ not json").unwrap();

        assert_eq!(load_app_config(&cfg_file).token, "");
    }

    #[test]
    fn test_track_filter() {
        let mut options = GetOptions::new(PathBuf::from("in"), "42", PathBuf::from("out"));
        assert!(options.wants_track(7));

        options.tracks = Some(vec![1, 3]);
        assert!(options.wants_track(3));
        assert!(!options.wants_track(2));
    }
}
