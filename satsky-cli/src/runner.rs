//! Shared command setup: configuration loading and logging.

use std::path::{Path, PathBuf};

use satsky::catalog::{Catalog, CatalogLoader};
use satsky::config::{config_file_path, ConfigFile};
use tracing::info;

use crate::error::CliError;
use crate::logging::{self, LoggingGuard};

/// Holds what every command needs for its lifetime.
pub struct CliRunner {
    config: ConfigFile,
    config_path: PathBuf,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Loads the configuration file and installs logging.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;
        let logging = logging::init(&config.logging, verbose)?;

        Ok(Self {
            config,
            config_path,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = satsky::VERSION,
            command,
            config = %self.config_path.display(),
            "SatSky starting"
        );
    }

    /// Loads the catalog named by the configuration.
    pub fn load_catalog(&self) -> Result<Catalog, CliError> {
        let settings = &self.config.catalog;
        let mut loader = CatalogLoader::new(&settings.tle_dir);
        if let Some(dir) = &settings.descriptor_dir {
            if dir.is_dir() {
                loader = loader.with_descriptor_dir(dir);
            }
        }
        Ok(loader.load()?)
    }
}
