use gigapark_core::{GarageStore, StoreError};
use gigapark_shared::{Spot, Ticket};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct GarageDocument {
    #[serde(default)]
    spots: Vec<Spot>,
    #[serde(default)]
    tickets: Vec<Ticket>,
}

/// Both tables in one JSON document on disk.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous document intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<GarageDocument, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No garage file at {}, starting empty", self.path.display());
                Ok(GarageDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl GarageStore for JsonFileStore {
    fn load_spots(&self) -> Result<Vec<Spot>, StoreError> {
        Ok(self.read_document()?.spots)
    }

    fn load_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.read_document()?.tickets)
    }

    fn save_all(&self, spots: &[Spot], tickets: &[Ticket]) -> Result<(), StoreError> {
        #[derive(Serialize)]
        struct DocumentRef<'a> {
            spots: &'a [Spot],
            tickets: &'a [Ticket],
        }

        let bytes = serde_json::to_vec_pretty(&DocumentRef { spots, tickets })?;
        let temp = self.temp_path();
        fs::write(&temp, bytes)?;
        fs::rename(&temp, &self.path)?;

        debug!(
            "Saved {} spots and {} tickets to {}",
            spots.len(),
            tickets.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("garage.json"));

        assert!(store.load_spots().unwrap().is_empty());
        assert!(store.load_tickets().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garage.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load_spots(), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("garage.json"));

        store.save_all(&[Spot::new(0, true)], &[]).unwrap();

        assert!(store.path().exists());
        assert!(!dir.path().join("garage.json.tmp").exists());
        assert_eq!(store.load_spots().unwrap(), vec![Spot::new(0, true)]);
    }
}
