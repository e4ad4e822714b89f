pub mod models;
pub mod plate;

pub use models::{Spot, SpotFilter, SpotId, Ticket, TicketId};
pub use plate::MaskedPlate;
