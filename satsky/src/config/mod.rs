//! Persistent configuration.
//!
//! Settings live in an INI file at `<config dir>/satsky/config.ini`:
//!
//! ```ini
//! [render]
//! image_size = 1024
//! marker_radius = 2
//! min_elevation_deg = 0
//!
//! [timing]
//! frame_period_secs = 0.25
//! frames_per_batch = 60
//! ut1_utc_offset_secs = 0.0614
//! start_delay_secs = 10
//!
//! [observer]
//! latitude_deg = 51.4779
//! longitude_deg = -0.0015
//! altitude_m = 45
//!
//! [catalog]
//! tle_dir = ./caches/tle
//! descriptor_dir = ./caches/descriptors
//!
//! [pipeline]
//! queue_capacity = 240
//! lookahead_batches = 3
//! poll_interval_ms = 1000
//!
//! [logging]
//! directory = ~/.cache/satsky/logs
//! level = info
//! ```
//!
//! A missing file or key falls back to the default. An invalid value is an
//! error naming the key.

mod error;
mod file;
mod keys;

pub use error::ConfigFileError;
pub use file::{
    config_dir, config_file_path, CatalogSettings, ConfigFile, LoggingSettings, PipelineSettings,
    RenderSettings, TimingSettings,
};
pub use keys::ConfigKey;
