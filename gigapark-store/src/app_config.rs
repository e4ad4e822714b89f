use gigapark_core::{GarageLayout, TariffConfig};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub garage: GarageLayout,
    #[serde(default)]
    pub tariff: TariffConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Json,
    Redb,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf { PathBuf::from("gigapark.json") }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: default_storage_path(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from("config", &run_mode)
    }

    /// Layered load: `{dir}/default` → `{dir}/{run_mode}` → `{dir}/local` → `GIGAPARK__*` env
    pub fn load_from(dir: &str, run_mode: &str) -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg.. `GIGAPARK__GARAGE__CAPACITY=60`
            .add_source(config::Environment::with_prefix("GIGAPARK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_layered_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[garage]
capacity = 50
permanent_spots = 40

[tariff]
cents_per_hour = 150

[storage]
backend = "redb"
path = "garage.redb"
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("test.toml"),
            "[garage]\ncapacity = 60\npermanent_spots = 30\nbuffer_threshold = 3\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path().to_str().unwrap(), "test").unwrap();
        assert_eq!(config.garage, GarageLayout::new(60, 30).with_buffer_threshold(3));
        assert_eq!(config.tariff.cents_per_hour, 150);
        assert_eq!(config.tariff.grace_minutes, 0);
        assert_eq!(config.storage.backend, StorageBackend::Redb);
        assert_eq!(config.storage.path, PathBuf::from("garage.redb"));
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().to_str().unwrap(), "missing").unwrap();

        assert_eq!(config.garage, GarageLayout::default());
        assert_eq!(config.storage.backend, StorageBackend::Json);
    }
}
