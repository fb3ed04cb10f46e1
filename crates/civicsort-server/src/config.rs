//! Server configuration
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file,
//! `CIVICSORT__*` environment variables, command-line flags.

use civicsort_classifiers::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Classification engine settings
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl ServerConfig {
    /// Load configuration from file, environment and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_sources(Path::new(config_path))?;

        if let Some(model_path) = &cli.model_path {
            config.classifier.model_path = model_path.into();
        }
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }

        config.classifier.validate()?;
        Ok(config)
    }

    /// Merge the optional file with environment overrides
    fn from_sources(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("CIVICSORT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            classifier: ClassifierConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}
