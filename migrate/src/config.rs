use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Config file of the legacy gateway proxy. Only the registry settings are read.
///
/// Missing keys decode as empty strings. An empty `registryAddr` is rejected
/// later, when the registry is opened.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyConfig {
    /// `consul://host:port` or `etcd://host:port[,host:port...]`
    pub registry_addr: String,
    pub prefix: String,
}

impl LegacyConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}
