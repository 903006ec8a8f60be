//! The INI configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::error::ConfigFileError;
use super::keys::ConfigKey;
use crate::pipeline::SchedulerConfig;
use crate::render::{Observer, RenderConfig, DEFAULT_IMAGE_SIZE, DEFAULT_MARKER_RADIUS};
use crate::time::{TimeError, TimeSystemConverter};

/// Default location: `<config dir>/satsky/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("satsky")
}

fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("satsky")
        .join("logs")
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub image_size: u32,
    pub marker_radius: u32,
    pub min_elevation_deg: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            marker_radius: DEFAULT_MARKER_RADIUS,
            min_elevation_deg: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingSettings {
    pub frame_period_secs: f64,
    pub frames_per_batch: usize,
    /// UT1 minus UTC, fixed for the whole run.
    pub ut1_utc_offset_secs: f64,
    pub start_delay_secs: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            frame_period_secs: 0.25,
            frames_per_batch: 60,
            ut1_utc_offset_secs: 0.0614,
            start_delay_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub tle_dir: PathBuf,
    pub descriptor_dir: Option<PathBuf>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            tle_dir: PathBuf::from("./caches/tle"),
            descriptor_dir: Some(PathBuf::from("./caches/descriptors")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub queue_capacity: usize,
    pub lookahead_batches: u32,
    pub poll_interval_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 240,
            lookahead_batches: 3,
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file directory; unset logs to the console only.
    pub directory: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: Some(default_log_dir()),
            level: "info".to_string(),
        }
    }
}

/// Every persisted setting, grouped by INI section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub render: RenderSettings,
    pub timing: TimingSettings,
    pub observer: Observer,
    pub catalog: CatalogSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`. A missing file yields the defaults; missing keys
    /// keep their default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigFileError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Saves to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Writes every key, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_error = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_error)
    }

    // ===== Runtime configuration =====

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(self.timing.frame_period_secs)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::default()
            .with_image_size(self.render.image_size)
            .with_marker_radius(self.render.marker_radius)
            .with_min_elevation(self.render.min_elevation_deg)
            .with_observer(self.observer)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_lookahead_batches(self.pipeline.lookahead_batches)
            .with_poll_interval(self.poll_interval())
            .with_start_delay(Duration::from_secs(self.timing.start_delay_secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.pipeline.poll_interval_ms)
    }

    pub fn time_converter(&self) -> Result<TimeSystemConverter, TimeError> {
        TimeSystemConverter::new(
            self.frame_period(),
            self.timing.frames_per_batch,
            self.timing.ut1_utc_offset_secs,
        )
    }
}
