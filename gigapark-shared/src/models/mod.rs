pub mod spot;
pub mod ticket;

pub use spot::{Spot, SpotFilter, SpotId};
pub use ticket::{Ticket, TicketId};
