//! Service configuration.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use cookbook_auth::AuthConfig;
use cookbook_graph::GraphConfig;
use serde::Deserialize;

const ENV_PREFIX: &str = "COOKBOOK";

/// Top-level configuration.
///
/// Loaded from an optional `<prefix>.toml` file, then overridden by
/// `COOKBOOK__`-prefixed environment variables, e.g. `COOKBOOK__NEO4J__URI`
/// or `COOKBOOK__AUTH__JWT_SECRET`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub neo4j: GraphConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl ServiceConfig {
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(File::with_name(file_prefix).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
