use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::models::spot::SpotId;

pub type TicketId = u64;

/// Record of one parking session, from entry to exit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub license_plate: String,

    /// Zero at issuance, set on exit (minor currency units)
    pub cost_cents: i64,

    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub is_permanent: bool,
    pub spot_id: SpotId,
}

impl Ticket {
    /// Issue a fresh, open ticket
    pub fn issue(
        id: TicketId,
        license_plate: String,
        is_permanent: bool,
        spot_id: SpotId,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            license_plate,
            cost_cents: 0,
            entry_time,
            exit_time: None,
            is_permanent,
            spot_id,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}
