use crate::layout::{GarageLayout, LayoutError};
use crate::ledger::{LedgerError, TicketLedger};
use crate::pricing::{format_cents, Tariff};
use crate::registry::{RegistryError, SpotRegistry};
use crate::repository::{GarageStore, StoreError};
use chrono::Utc;
use gigapark_shared::{plate, MaskedPlate, Spot, SpotFilter, SpotId, Ticket, TicketId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of a successful entry or exit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusMessage {
    Entered {
        ticket_id: TicketId,
        spot_id: SpotId,
    },
    Exited {
        ticket_id: TicketId,
        spot_id: SpotId,
        cost_cents: i64,
    },
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Entered { spot_id, .. } => {
                write!(f, "Please drive in. Your spot is number {}.", spot_id)
            }
            StatusMessage::Exited { cost_cents, .. } => {
                write!(f, "See you soon! Parking fee: {}.", format_cents(*cost_cents))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Garage is full: {free} free spots, {required} required")]
    GarageFull {
        free: usize,
        required: u32,
    },

    #[error("License plate is required")]
    LicensePlateRequired,

    #[error("No open ticket for plate {0}")]
    PlateNotFound(String),

    #[error("Vehicle {0} is already parked")]
    PlateAlreadyParked(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Stored garage state is inconsistent: {0}")]
    CorruptSnapshot(String),
}

/// Allocation engine: sole owner of the spot registry and ticket ledger.
///
/// Every mutating call is all-or-nothing. When a step fails, including
/// the write-through to the store, the registry and ledger are put back
/// to their state before the call.
pub struct AllocationEngine {
    layout: GarageLayout,
    registry: SpotRegistry,
    ledger: TicketLedger,
    tariff: Box<dyn Tariff>,
    store: Arc<dyn GarageStore>,
}

impl AllocationEngine {
    /// Load persisted state and bring the spot pool to the configured layout.
    ///
    /// A capacity change rebuilds the pool from scratch and drops the
    /// ledger, since old tickets would point at spots that no longer exist.
    pub fn open(
        layout: GarageLayout,
        store: Arc<dyn GarageStore>,
        tariff: Box<dyn Tariff>,
    ) -> Result<Self, EngineError> {
        layout.validate()?;

        let mut registry = SpotRegistry::from_spots(store.load_spots()?)?;
        let mut ledger = TicketLedger::from_tickets(store.load_tickets()?);

        let rebuilt = registry.initialize(layout.capacity, layout.permanent_spots);
        if rebuilt && !ledger.is_empty() {
            warn!(
                "Spot pool rebuilt for capacity {}, discarding {} stored tickets",
                layout.capacity,
                ledger.len()
            );
            ledger.clear();
        }

        let engine = Self {
            layout,
            registry,
            ledger,
            tariff,
            store,
        };

        if rebuilt {
            engine.persist()?;
            info!(
                "Initialized {} spots ({} reserved for permanent parkers)",
                engine.layout.capacity, engine.layout.permanent_spots
            );
        } else {
            engine.check_invariants()?;
        }

        Ok(engine)
    }

    /// Admit a vehicle: buffer check, spot selection, ticket issue, link.
    pub fn drive_in(&mut self, license_plate: &str, is_permanent: bool) -> Result<StatusMessage, EngineError> {
        let plate = plate::normalize(license_plate).ok_or(EngineError::LicensePlateRequired)?;

        if self.ledger.find_open_ticket_by_plate(plate).is_some() {
            warn!("Entry refused, {} is already parked", MaskedPlate(plate));
            return Err(EngineError::PlateAlreadyParked(plate.to_string()));
        }

        let free = self.registry.count_free(SpotFilter::for_parker(is_permanent));
        if !self.has_capacity_buffer(is_permanent) {
            warn!(
                "Entry refused for {}: {} free spots, buffer is {}",
                MaskedPlate(plate),
                free,
                self.layout.buffer_threshold
            );
            return Err(self.garage_full(free));
        }

        let spot_id = match self.registry.find_free_spot(is_permanent) {
            Ok(spot_id) => spot_id,
            Err(RegistryError::NoSpotAvailable) => {
                error!(
                    "Buffer check passed with {} free spots but no spot matched (permanent: {})",
                    free, is_permanent
                );
                return Err(self.garage_full(free));
            }
            Err(err) => return Err(err.into()),
        };

        let ticket_id = self.ledger.create(plate, is_permanent, spot_id, Utc::now())?;

        if let Err(err) = self.registry.occupy(spot_id, ticket_id) {
            self.ledger.discard(ticket_id);
            error!("Could not occupy spot {}: {}", spot_id, err);
            return Err(err.into());
        }

        if let Err(err) = self.persist() {
            let _ = self.registry.release(spot_id);
            self.ledger.discard(ticket_id);
            error!("Entry of {} rolled back, store failed: {}", MaskedPlate(plate), err);
            return Err(err.into());
        }

        info!(
            "Vehicle {} entered: ticket {} on spot {} (permanent: {})",
            MaskedPlate(plate),
            ticket_id,
            spot_id,
            is_permanent
        );
        Ok(StatusMessage::Entered { ticket_id, spot_id })
    }

    /// Let a vehicle leave: close its ticket with the tariff's cost and
    /// free its spot.
    pub fn drive_out(&mut self, license_plate: &str) -> Result<StatusMessage, EngineError> {
        let plate = plate::normalize(license_plate).ok_or(EngineError::LicensePlateRequired)?;

        let ticket = self.ledger
            .find_open_ticket_by_plate(plate)
            .ok_or_else(|| EngineError::PlateNotFound(plate.to_string()))?;
        let ticket_id = ticket.id;
        let spot_id = ticket.spot_id;

        match self.registry.get(spot_id).map(|spot| spot.occupying_ticket) {
            None => return Err(self.invariant_violation(RegistryError::UnknownSpot(spot_id))),
            Some(None) => return Err(self.invariant_violation(RegistryError::SpotNotOccupied(spot_id))),
            Some(Some(current)) if current != ticket_id => {
                return Err(self.invariant_violation(RegistryError::SpotAlreadyOccupied {
                    spot_id,
                    ticket_id: current,
                }));
            }
            Some(Some(_)) => {}
        }

        let exit_time = Utc::now();
        let cost_cents = self.tariff.cost_cents(ticket, exit_time);
        self.ledger.close(ticket_id, exit_time, cost_cents)?;

        if let Err(err) = self.registry.release(spot_id) {
            self.ledger.reopen(ticket_id);
            return Err(self.invariant_violation(err));
        }

        if let Err(err) = self.persist() {
            let _ = self.registry.occupy(spot_id, ticket_id);
            self.ledger.reopen(ticket_id);
            error!("Exit of {} rolled back, store failed: {}", MaskedPlate(plate), err);
            return Err(err.into());
        }

        info!(
            "Vehicle {} left spot {}: ticket {} closed at {} cents",
            MaskedPlate(plate),
            spot_id,
            ticket_id,
            cost_cents
        );
        Ok(StatusMessage::Exited {
            ticket_id,
            spot_id,
            cost_cents,
        })
    }

    /// Whether the capacity buffer holds for this kind of parker
    pub fn is_available(&self, is_permanent: bool) -> bool {
        self.has_capacity_buffer(is_permanent)
    }

    /// Total free spots across both partitions
    pub fn free_count(&self) -> usize {
        self.registry.count_free(SpotFilter::Any)
    }

    pub fn count_free(&self, filter: SpotFilter) -> usize {
        self.registry.count_free(filter)
    }

    /// Back to factory state: no tickets, every spot free.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        let previous = (self.registry.clone(), self.ledger.clone());

        self.ledger.clear();
        self.registry.clear();
        self.registry.initialize(self.layout.capacity, self.layout.permanent_spots);

        if let Err(err) = self.persist() {
            (self.registry, self.ledger) = previous;
            error!("Reset rolled back, store failed: {}", err);
            return Err(err.into());
        }

        info!("Garage reset to {} free spots", self.layout.capacity);
        Ok(())
    }

    /// Verify the spot/ticket cross references in both directions
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        for spot in self.registry.spots() {
            if let Some(ticket_id) = spot.occupying_ticket {
                match self.ledger.get(ticket_id) {
                    Some(ticket) if ticket.is_open() && ticket.spot_id == spot.id => {}
                    _ => {
                        return Err(EngineError::CorruptSnapshot(format!(
                            "spot {} references ticket {} without a matching open ticket",
                            spot.id, ticket_id
                        )));
                    }
                }
            }
        }

        for ticket in self.ledger.open_tickets() {
            match self.registry.get(ticket.spot_id) {
                Some(spot) if spot.occupying_ticket == Some(ticket.id) => {}
                _ => {
                    return Err(EngineError::CorruptSnapshot(format!(
                        "open ticket {} is not linked from spot {}",
                        ticket.id, ticket.spot_id
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn layout(&self) -> &GarageLayout {
        &self.layout
    }

    pub fn spots(&self) -> &[Spot] {
        self.registry.spots()
    }

    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.ledger.tickets()
    }

    pub fn ticket(&self, ticket_id: TicketId) -> Option<&Ticket> {
        self.ledger.get(ticket_id)
    }

    pub fn open_ticket_count(&self) -> usize {
        self.ledger.open_count()
    }

    fn has_capacity_buffer(&self, is_permanent: bool) -> bool {
        self.registry.count_free(SpotFilter::for_parker(is_permanent))
            >= self.layout.buffer_threshold as usize
    }

    fn garage_full(&self, free: usize) -> EngineError {
        EngineError::GarageFull {
            free,
            required: self.layout.buffer_threshold,
        }
    }

    fn invariant_violation(&self, err: RegistryError) -> EngineError {
        error!("Spot/ticket invariant violated: {}", err);
        err.into()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let tickets: Vec<Ticket> = self.ledger.tickets().cloned().collect();
        self.store.save_all(self.registry.spots(), &tickets)
    }
}
