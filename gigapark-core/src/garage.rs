use crate::engine::{AllocationEngine, EngineError, StatusMessage};
use crate::layout::GarageLayout;
use crate::pricing::Tariff;
use crate::repository::GarageStore;
use gigapark_shared::{plate, Spot, Ticket};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const WELCOME_TEXT: &str = "Welcome to GigaPark!";
pub const FAREWELL_TEXT: &str = "See you soon!";

/// Consistent copy of both tables
#[derive(Debug, Clone, Serialize)]
pub struct GarageSnapshot {
    pub spots: Vec<Spot>,
    pub tickets: Vec<Ticket>,
}

/// Entry point for the presentation layer.
///
/// Entry, exit and reset are serialized through one write lock, so spot
/// selection and occupation can never interleave between two callers.
/// Queries share the read lock and see both collections at one instant.
pub struct Garage {
    engine: RwLock<AllocationEngine>,
}

impl Garage {
    pub fn new(engine: AllocationEngine) -> Self {
        Self {
            engine: RwLock::new(engine),
        }
    }

    pub fn open(
        layout: GarageLayout,
        store: Arc<dyn GarageStore>,
        tariff: Box<dyn Tariff>,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(AllocationEngine::open(layout, store, tariff)?))
    }

    pub async fn drive_in(&self, license_plate: &str, is_permanent: bool) -> Result<StatusMessage, EngineError> {
        let plate = plate::normalize(license_plate).ok_or(EngineError::LicensePlateRequired)?;
        self.engine.write().await.drive_in(plate, is_permanent)
    }

    pub async fn drive_out(&self, license_plate: &str) -> Result<StatusMessage, EngineError> {
        let plate = plate::normalize(license_plate).ok_or(EngineError::LicensePlateRequired)?;
        self.engine.write().await.drive_out(plate)
    }

    pub async fn is_available(&self, is_permanent: bool) -> bool {
        self.engine.read().await.is_available(is_permanent)
    }

    pub async fn free_count(&self) -> usize {
        self.engine.read().await.free_count()
    }

    pub async fn reset(&self) -> Result<(), EngineError> {
        self.engine.write().await.reset()
    }

    /// Entrance display line. Counts only the spots above the buffer,
    /// since those are the ones a transient parker can actually get.
    pub async fn availability_text(&self) -> String {
        let engine = self.engine.read().await;
        if !engine.is_available(false) {
            return "No spots available".to_string();
        }

        let held_back = engine.layout().buffer_threshold.saturating_sub(1) as usize;
        format!("{} free spots", engine.free_count().saturating_sub(held_back))
    }

    pub async fn snapshot(&self) -> GarageSnapshot {
        let engine = self.engine.read().await;
        GarageSnapshot {
            spots: engine.spots().to_vec(),
            tickets: engine.tickets().cloned().collect(),
        }
    }

    pub async fn layout(&self) -> GarageLayout {
        self.engine.read().await.layout().clone()
    }

    pub async fn check_invariants(&self) -> Result<(), EngineError> {
        self.engine.read().await.check_invariants()
    }
}

/// Display text for an entry or exit outcome
pub fn status_line(outcome: &Result<StatusMessage, EngineError>) -> String {
    let err = match outcome {
        Ok(message) => return message.to_string(),
        Err(err) => err,
    };

    let text = match err {
        EngineError::GarageFull { .. } => ":( No parking spots are available right now.",
        EngineError::LicensePlateRequired => "Please enter a license plate.",
        EngineError::PlateNotFound(_) => "No parked vehicle with this license plate.",
        EngineError::PlateAlreadyParked(_) => "This vehicle is already parked.",
        EngineError::Store(_) => "The garage system is unavailable, please try again.",
        _ => "Something went wrong, please call the attendant.",
    };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::HourlyTariff;
    use crate::repository::MemoryStore;

    fn garage(layout: GarageLayout) -> Garage {
        Garage::open(layout, Arc::new(MemoryStore::new()), Box::new(HourlyTariff::default())).unwrap()
    }

    #[tokio::test]
    async fn test_facade_rejects_blank_plates() {
        let garage = garage(GarageLayout::new(10, 0));

        assert!(matches!(garage.drive_in("", false).await, Err(EngineError::LicensePlateRequired)));
        assert!(matches!(garage.drive_out(" ").await, Err(EngineError::LicensePlateRequired)));
        assert_eq!(garage.free_count().await, 10);
    }

    #[tokio::test]
    async fn test_availability_text() {
        let garage = garage(GarageLayout::new(50, 40));
        assert_eq!(garage.availability_text().await, "46 free spots");

        for n in 0..6 {
            garage.drive_in(&format!("T-{}", n), false).await.unwrap();
        }
        // 4 general spots left, below the buffer
        assert_eq!(garage.availability_text().await, "No spots available");
    }

    #[tokio::test]
    async fn test_snapshot_reflects_both_tables() {
        let garage = garage(GarageLayout::new(10, 2));
        garage.drive_in("AB-1", true).await.unwrap();

        let snapshot = garage.snapshot().await;
        assert_eq!(snapshot.spots.len(), 10);
        assert_eq!(snapshot.tickets.len(), 1);
        assert_eq!(snapshot.spots[0].occupying_ticket, Some(snapshot.tickets[0].id));
    }

    #[tokio::test]
    async fn test_status_lines() {
        let garage = garage(GarageLayout::new(10, 0));

        let entered = garage.drive_in("AB-1", false).await;
        assert_eq!(status_line(&entered), "Please drive in. Your spot is number 0.");

        let missing = garage.drive_out("ZZ-9").await;
        assert!(matches!(missing, Err(EngineError::PlateNotFound(_))));
        assert_eq!(status_line(&missing), "No parked vehicle with this license plate.");

        let blank = garage.drive_in("", false).await;
        assert_eq!(status_line(&blank), "Please enter a license plate.");
    }
}
