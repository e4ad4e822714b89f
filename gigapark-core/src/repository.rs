use gigapark_shared::{Spot, Ticket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Persistence contract for the two garage tables.
///
/// Loaded once at startup and written through after every mutating
/// operation. Calls are synchronous; backends own their timeout policy.
pub trait GarageStore: Send + Sync {
    fn load_spots(&self) -> Result<Vec<Spot>, StoreError>;

    fn load_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Replace both tables with the given rows
    fn save_all(&self, spots: &[Spot], tickets: &[Ticket]) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Default)]
struct Tables {
    spots: Vec<Spot>,
    tickets: Vec<Ticket>,
}

/// Volatile store keeping the last saved tables in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with rows, as if saved by an earlier run
    pub fn with_tables(spots: Vec<Spot>, tickets: Vec<Ticket>) -> Self {
        Self {
            tables: Mutex::new(Tables { spots, tickets }),
            ..Self::default()
        }
    }

    /// Make every following `save_all` fail until switched back
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl GarageStore for MemoryStore {
    fn load_spots(&self) -> Result<Vec<Spot>, StoreError> {
        Ok(self.tables()?.spots.clone())
    }

    fn load_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.tables()?.tickets.clone())
    }

    fn save_all(&self, spots: &[Spot], tickets: &[Ticket]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store rejected write".to_string()));
        }

        let mut tables = self.tables()?;
        tables.spots = spots.to_vec();
        tables.tickets = tickets.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load_spots().unwrap().is_empty());

        let spots = vec![Spot::new(0, true), Spot::new(1, false)];
        let tickets = vec![Ticket::issue(1, "AB-1".to_string(), false, 1, Utc::now())];
        store.save_all(&spots, &tickets).unwrap();

        assert_eq!(store.load_spots().unwrap(), spots);
        assert_eq!(store.load_tickets().unwrap(), tickets);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_memory_store_failure_injection() {
        let store = MemoryStore::with_tables(vec![Spot::new(0, false)], vec![]);
        store.set_fail_saves(true);

        assert!(matches!(store.save_all(&[], &[]), Err(StoreError::Backend(_))));
        // Previous tables untouched
        assert_eq!(store.load_spots().unwrap().len(), 1);
        assert_eq!(store.save_count(), 0);
    }
}
