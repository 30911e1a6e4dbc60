//! ConfigLoader: layers the configuration sources and deserializes the result.

use super::{xdg, ShelfConfig};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `LINKSHELF__TREE__MAX_DEPTH=4`
pub const ENV_PREFIX: &str = "LINKSHELF";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources.
    ///
    /// Precedence, lowest first: defaults, global file (optional), `explicit`
    /// file (must exist), environment.
    pub fn load(explicit: Option<&Path>) -> Result<ShelfConfig, ConfigError> {
        let global = xdg::global_config_path().ok();
        Self::load_layers(global.as_deref(), explicit, None)
    }

    /// Load from a single file plus the environment, skipping the global file.
    pub fn load_from_file(path: &Path) -> Result<ShelfConfig, ConfigError> {
        Self::load_layers(None, Some(path), None)
    }

    pub(crate) fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<ShelfConfig, ConfigError> {
        let mut builder = builder_with_defaults()?;
        if let Some(path) = global {
            builder = builder.add_source(toml_file(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(toml_file(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );
        builder.build()?.try_deserialize()
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&ShelfConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(PathBuf::from(path)).format(FileFormat::Toml)
}
