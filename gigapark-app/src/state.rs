use anyhow::Context;
use gigapark_core::{Garage, GarageStore, HourlyTariff, MemoryStore};
use gigapark_store::{Config, JsonFileStore, RedbStore, StorageBackend};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub garage: Arc<Garage>,
}

impl AppState {
    /// Open the configured store and bring the garage up on it
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn GarageStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Json => Arc::new(JsonFileStore::new(&config.storage.path)),
            StorageBackend::Redb => Arc::new(
                RedbStore::open(&config.storage.path)
                    .with_context(|| format!("Failed to open {}", config.storage.path.display()))?,
            ),
        };

        tracing::info!(
            "Using {:?} storage at {}",
            config.storage.backend,
            config.storage.path.display()
        );

        let garage = Garage::open(
            config.garage.clone(),
            store,
            Box::new(HourlyTariff::new(config.tariff.clone())),
        )
        .context("Failed to open garage")?;

        Ok(Self {
            garage: Arc::new(garage),
        })
    }
}
