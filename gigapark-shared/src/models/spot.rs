use serde::{Deserialize, Serialize};
use crate::models::ticket::TicketId;

pub type SpotId = u32;

/// One physical parking space
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Spot {
    pub id: SpotId,

    /// Fixed at creation; reserved spots only take permanent parkers
    pub reserved_for_permanent: bool,

    /// Ticket currently parked here, `None` when free
    pub occupying_ticket: Option<TicketId>,
}

impl Spot {
    pub fn new(id: SpotId, reserved_for_permanent: bool) -> Self {
        Self {
            id,
            reserved_for_permanent,
            occupying_ticket: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.occupying_ticket.is_none()
    }

    /// Whether this spot belongs to the partition selected by `filter`
    pub fn matches(&self, filter: SpotFilter) -> bool {
        match filter {
            SpotFilter::Any => true,
            SpotFilter::Reserved => self.reserved_for_permanent,
            SpotFilter::General => !self.reserved_for_permanent,
        }
    }
}

/// Partition filter for free-spot counting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotFilter {
    Any,
    Reserved,
    General,
}

impl SpotFilter {
    /// The partition a parker may use: permanent parkers park anywhere,
    /// everyone else only on general spots.
    pub fn for_parker(is_permanent: bool) -> Self {
        if is_permanent {
            SpotFilter::Any
        } else {
            SpotFilter::General
        }
    }
}
