use std::path::Path;
use std::sync::Arc;

use gigapark_core::{GarageStore, StoreError};
use gigapark_shared::{Spot, SpotId, Ticket, TicketId};
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

const SPOTS: TableDefinition<SpotId, &[u8]> = TableDefinition::new("spots");
const TICKETS: TableDefinition<TicketId, &[u8]> = TableDefinition::new("tickets");

fn backend_err(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Embedded redb database with one table per record type, keyed by id.
/// Each row holds the record as JSON.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database and make sure both tables exist.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(backend_err)?;

        let write_txn = db.begin_write().map_err(backend_err)?;
        {
            write_txn.open_table(SPOTS).map_err(backend_err)?;
            write_txn.open_table(TICKETS).map_err(backend_err)?;
        }
        write_txn.commit().map_err(backend_err)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl GarageStore for RedbStore {
    fn load_spots(&self) -> Result<Vec<Spot>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(SPOTS).map_err(backend_err)?;

        let mut spots = Vec::new();
        for entry in table.iter().map_err(backend_err)? {
            let (_, value) = entry.map_err(backend_err)?;
            spots.push(serde_json::from_slice(value.value())?);
        }
        Ok(spots)
    }

    fn load_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(TICKETS).map_err(backend_err)?;

        let mut tickets = Vec::new();
        for entry in table.iter().map_err(backend_err)? {
            let (_, value) = entry.map_err(backend_err)?;
            tickets.push(serde_json::from_slice(value.value())?);
        }
        Ok(tickets)
    }

    /// Both tables are replaced inside a single write transaction.
    fn save_all(&self, spots: &[Spot], tickets: &[Ticket]) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(backend_err)?;
        {
            write_txn.delete_table(SPOTS).map_err(backend_err)?;
            write_txn.delete_table(TICKETS).map_err(backend_err)?;

            let mut spot_table = write_txn.open_table(SPOTS).map_err(backend_err)?;
            for spot in spots {
                let bytes = serde_json::to_vec(spot)?;
                spot_table.insert(spot.id, bytes.as_slice()).map_err(backend_err)?;
            }

            let mut ticket_table = write_txn.open_table(TICKETS).map_err(backend_err)?;
            for ticket in tickets {
                let bytes = serde_json::to_vec(ticket)?;
                ticket_table.insert(ticket.id, bytes.as_slice()).map_err(backend_err)?;
            }
        }
        write_txn.commit().map_err(backend_err)?;

        debug!("Committed {} spots and {} tickets to redb", spots.len(), tickets.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("garage.redb")).unwrap();
        assert!(store.load_spots().unwrap().is_empty());

        let spots: Vec<Spot> = (0..4).map(|id| Spot::new(id, id < 2)).collect();
        store.save_all(&spots, &[]).unwrap();
        store.save_all(&spots[..2], &[]).unwrap();

        assert_eq!(store.load_spots().unwrap(), spots[..2].to_vec());
    }
}
