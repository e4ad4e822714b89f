use gigapark_shared::{Spot, SpotFilter, SpotId, TicketId};

/// Fixed pool of parking spots and their occupancy.
///
/// Spot ids are dense: the spot with id `n` always lives at index `n`.
#[derive(Debug, Clone, Default)]
pub struct SpotRegistry {
    spots: Vec<Spot>,
}

impl SpotRegistry {
    pub fn new() -> Self {
        Self { spots: Vec::new() }
    }

    /// Rebuild from persisted rows (any order)
    pub fn from_spots(mut spots: Vec<Spot>) -> Result<Self, RegistryError> {
        spots.sort_by_key(|spot| spot.id);
        for (index, spot) in spots.iter().enumerate() {
            if spot.id as usize != index {
                return Err(RegistryError::NonDenseIds {
                    expected: index as SpotId,
                    found: spot.id,
                });
            }
        }
        Ok(Self { spots })
    }

    /// (Re)create `capacity` free spots, the first `permanent_count` reserved.
    ///
    /// No-op when the registry already holds exactly `capacity` spots.
    /// Returns whether the pool was rebuilt.
    pub fn initialize(&mut self, capacity: u32, permanent_count: u32) -> bool {
        if self.spots.len() == capacity as usize {
            return false;
        }

        self.spots = (0..capacity)
            .map(|id| Spot::new(id, id < permanent_count))
            .collect();
        true
    }

    /// Lowest free spot id the parker may use.
    ///
    /// Permanent parkers take any free spot; reserved spots come first by id
    /// so they are preferred. Transient parkers only get general spots.
    pub fn find_free_spot(&self, wants_permanent: bool) -> Result<SpotId, RegistryError> {
        let filter = SpotFilter::for_parker(wants_permanent);
        self.spots
            .iter()
            .find(|spot| spot.is_free() && spot.matches(filter))
            .map(|spot| spot.id)
            .ok_or(RegistryError::NoSpotAvailable)
    }

    /// Link a ticket to a free spot
    pub fn occupy(&mut self, spot_id: SpotId, ticket_id: TicketId) -> Result<(), RegistryError> {
        let spot = self.get_mut(spot_id)?;

        if let Some(current) = spot.occupying_ticket {
            return Err(RegistryError::SpotAlreadyOccupied {
                spot_id,
                ticket_id: current,
            });
        }

        spot.occupying_ticket = Some(ticket_id);
        Ok(())
    }

    /// Unlink the spot's ticket, returning the ticket id that was parked there
    pub fn release(&mut self, spot_id: SpotId) -> Result<TicketId, RegistryError> {
        let spot = self.get_mut(spot_id)?;
        spot.occupying_ticket
            .take()
            .ok_or(RegistryError::SpotNotOccupied(spot_id))
    }

    pub fn count_free(&self, filter: SpotFilter) -> usize {
        self.spots
            .iter()
            .filter(|spot| spot.is_free() && spot.matches(filter))
            .count()
    }

    pub fn count_reserved(&self) -> usize {
        self.spots.iter().filter(|spot| spot.reserved_for_permanent).count()
    }

    pub fn get(&self, spot_id: SpotId) -> Option<&Spot> {
        self.spots.get(spot_id as usize)
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn clear(&mut self) {
        self.spots.clear();
    }

    fn get_mut(&mut self, spot_id: SpotId) -> Result<&mut Spot, RegistryError> {
        self.spots
            .get_mut(spot_id as usize)
            .ok_or(RegistryError::UnknownSpot(spot_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("No free spot matches the request")]
    NoSpotAvailable,

    #[error("Spot {spot_id} is already occupied by ticket {ticket_id}")]
    SpotAlreadyOccupied {
        spot_id: SpotId,
        ticket_id: TicketId,
    },

    #[error("Spot {0} is not occupied")]
    SpotNotOccupied(SpotId),

    #[error("Unknown spot: {0}")]
    UnknownSpot(SpotId),

    #[error("Spot ids are not dense: expected {expected}, found {found}")]
    NonDenseIds {
        expected: SpotId,
        found: SpotId,
    },
}
