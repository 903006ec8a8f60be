//! Addressable configuration keys.
//!
//! Every setting in the file has a [`ConfigKey`]. Loading, saving and the
//! `config get/set/list` commands all go through the same key table, so a
//! value accepted by `set` is exactly a value accepted on load.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::ConfigFileError;
use super::file::ConfigFile;

const MAX_FRAME_PERIOD_SECS: f64 = 3600.0;

const MAX_LOOKAHEAD_BATCHES: u32 = 1000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    RenderImageSize,
    RenderMarkerRadius,
    RenderMinElevationDeg,
    TimingFramePeriodSecs,
    TimingFramesPerBatch,
    TimingUt1UtcOffsetSecs,
    TimingStartDelaySecs,
    ObserverLatitudeDeg,
    ObserverLongitudeDeg,
    ObserverAltitudeM,
    CatalogTleDir,
    CatalogDescriptorDir,
    PipelineQueueCapacity,
    PipelineLookaheadBatches,
    PipelinePollIntervalMs,
    LoggingDirectory,
    LoggingLevel,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            RenderImageSize,
            RenderMarkerRadius,
            RenderMinElevationDeg,
            TimingFramePeriodSecs,
            TimingFramesPerBatch,
            TimingUt1UtcOffsetSecs,
            TimingStartDelaySecs,
            ObserverLatitudeDeg,
            ObserverLongitudeDeg,
            ObserverAltitudeM,
            CatalogTleDir,
            CatalogDescriptorDir,
            PipelineQueueCapacity,
            PipelineLookaheadBatches,
            PipelinePollIntervalMs,
            LoggingDirectory,
            LoggingLevel,
        ]
    }

    /// Full name in `section.key` form.
    pub fn name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            RenderImageSize => "render.image_size",
            RenderMarkerRadius => "render.marker_radius",
            RenderMinElevationDeg => "render.min_elevation_deg",
            TimingFramePeriodSecs => "timing.frame_period_secs",
            TimingFramesPerBatch => "timing.frames_per_batch",
            TimingUt1UtcOffsetSecs => "timing.ut1_utc_offset_secs",
            TimingStartDelaySecs => "timing.start_delay_secs",
            ObserverLatitudeDeg => "observer.latitude_deg",
            ObserverLongitudeDeg => "observer.longitude_deg",
            ObserverAltitudeM => "observer.altitude_m",
            CatalogTleDir => "catalog.tle_dir",
            CatalogDescriptorDir => "catalog.descriptor_dir",
            PipelineQueueCapacity => "pipeline.queue_capacity",
            PipelineLookaheadBatches => "pipeline.lookahead_batches",
            PipelinePollIntervalMs => "pipeline.poll_interval_ms",
            LoggingDirectory => "logging.directory",
            LoggingLevel => "logging.level",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or((name, ""))
    }

    /// Current value as it would be written to the file. Unset optional
    /// values read as an empty string.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            RenderImageSize => config.render.image_size.to_string(),
            RenderMarkerRadius => config.render.marker_radius.to_string(),
            RenderMinElevationDeg => config.render.min_elevation_deg.to_string(),
            TimingFramePeriodSecs => config.timing.frame_period_secs.to_string(),
            TimingFramesPerBatch => config.timing.frames_per_batch.to_string(),
            TimingUt1UtcOffsetSecs => config.timing.ut1_utc_offset_secs.to_string(),
            TimingStartDelaySecs => config.timing.start_delay_secs.to_string(),
            ObserverLatitudeDeg => config.observer.latitude_deg.to_string(),
            ObserverLongitudeDeg => config.observer.longitude_deg.to_string(),
            ObserverAltitudeM => config.observer.altitude_m.to_string(),
            CatalogTleDir => config.catalog.tle_dir.display().to_string(),
            CatalogDescriptorDir => path_or_empty(&config.catalog.descriptor_dir),
            PipelineQueueCapacity => config.pipeline.queue_capacity.to_string(),
            PipelineLookaheadBatches => config.pipeline.lookahead_batches.to_string(),
            PipelinePollIntervalMs => config.pipeline.poll_interval_ms.to_string(),
            LoggingDirectory => path_or_empty(&config.logging.directory),
            LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Parses and stores `value`, leaving the config untouched on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            RenderImageSize => config.render.image_size = self.positive(value)?,
            RenderMarkerRadius => config.render.marker_radius = self.number(value)?,
            RenderMinElevationDeg => {
                let elevation = self.ranged(value, -90.0, 90.0)?;
                if elevation >= 90.0 {
                    return Err(self.invalid(value, "must be below 90"));
                }
                config.render.min_elevation_deg = elevation;
            }
            TimingFramePeriodSecs => {
                let period: f64 = self.number(value)?;
                if !(period > 0.0 && period <= MAX_FRAME_PERIOD_SECS) {
                    return Err(self.invalid(value, "must be between 0 and 3600 seconds"));
                }
                config.timing.frame_period_secs = period;
            }
            TimingFramesPerBatch => config.timing.frames_per_batch = self.positive(value)?,
            TimingUt1UtcOffsetSecs => {
                config.timing.ut1_utc_offset_secs = self.ranged(value, -0.9, 0.9)?
            }
            TimingStartDelaySecs => config.timing.start_delay_secs = self.number(value)?,
            ObserverLatitudeDeg => config.observer.latitude_deg = self.ranged(value, -90.0, 90.0)?,
            ObserverLongitudeDeg => {
                config.observer.longitude_deg = self.ranged(value, -180.0, 180.0)?
            }
            ObserverAltitudeM => config.observer.altitude_m = self.ranged(value, -500.0, 10_000.0)?,
            CatalogTleDir => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.catalog.tle_dir = PathBuf::from(value);
            }
            CatalogDescriptorDir => config.catalog.descriptor_dir = optional_path(value),
            PipelineQueueCapacity => config.pipeline.queue_capacity = self.positive(value)?,
            PipelineLookaheadBatches => {
                let batches: u32 = self.number(value)?;
                if batches > MAX_LOOKAHEAD_BATCHES {
                    return Err(self.invalid(
                        value,
                        format!("must be at most {}", MAX_LOOKAHEAD_BATCHES),
                    ));
                }
                config.pipeline.lookahead_batches = batches;
            }
            PipelinePollIntervalMs => config.pipeline.poll_interval_ms = self.positive(value)?,
            LoggingDirectory => config.logging.directory = optional_path(value),
            LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigFileError {
        ConfigFileError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn number<T>(&self, value: &str) -> Result<T, ConfigFileError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value.parse().map_err(|e: T::Err| self.invalid(value, e.to_string()))
    }

    fn positive<T>(&self, value: &str) -> Result<T, ConfigFileError>
    where
        T: FromStr + Default + PartialOrd,
        T::Err: fmt::Display,
    {
        let parsed: T = self.number(value)?;
        if parsed <= T::default() {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(parsed)
    }

    fn ranged(&self, value: &str, min: f64, max: f64) -> Result<f64, ConfigFileError> {
        let parsed: f64 = self.number(value)?;
        if !(min..=max).contains(&parsed) {
            return Err(self.invalid(value, format!("must be between {} and {}", min, max)));
        }
        Ok(parsed)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigFileError::UnknownKey(s.to_string()))
    }
}

fn path_or_empty(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}
