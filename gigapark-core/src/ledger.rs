use chrono::{DateTime, Utc};
use gigapark_shared::{plate, SpotId, Ticket, TicketId};
use std::collections::BTreeMap;

/// Issued tickets, keyed by id
#[derive(Debug, Clone)]
pub struct TicketLedger {
    tickets: BTreeMap<TicketId, Ticket>,
    next_id: TicketId,
}

impl TicketLedger {
    pub fn new() -> Self {
        Self {
            tickets: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Rebuild from persisted rows; new ids continue after the highest one
    pub fn from_tickets(tickets: Vec<Ticket>) -> Self {
        let tickets: BTreeMap<TicketId, Ticket> =
            tickets.into_iter().map(|ticket| (ticket.id, ticket)).collect();
        let next_id = tickets.keys().next_back().map_or(1, |id| id + 1);
        Self { tickets, next_id }
    }

    /// Issue an open ticket for `spot_id`
    pub fn create(
        &mut self,
        license_plate: &str,
        is_permanent: bool,
        spot_id: SpotId,
        entry_time: DateTime<Utc>,
    ) -> Result<TicketId, LedgerError> {
        let license_plate = plate::normalize(license_plate).ok_or(LedgerError::InvalidLicensePlate)?;

        let id = self.next_id;
        self.next_id += 1;
        self.tickets.insert(
            id,
            Ticket::issue(id, license_plate.to_string(), is_permanent, spot_id, entry_time),
        );
        Ok(id)
    }

    /// Transition: open → closed
    pub fn close(
        &mut self,
        ticket_id: TicketId,
        exit_time: DateTime<Utc>,
        cost_cents: i64,
    ) -> Result<&Ticket, LedgerError> {
        let ticket = self.tickets
            .get_mut(&ticket_id)
            .ok_or(LedgerError::TicketNotFound(ticket_id))?;

        if !ticket.is_open() {
            return Err(LedgerError::TicketAlreadyClosed(ticket_id));
        }

        ticket.exit_time = Some(exit_time);
        ticket.cost_cents = cost_cents;
        Ok(ticket)
    }

    /// Undo a `close` that could not be completed
    pub(crate) fn reopen(&mut self, ticket_id: TicketId) {
        if let Some(ticket) = self.tickets.get_mut(&ticket_id) {
            ticket.exit_time = None;
            ticket.cost_cents = 0;
        }
    }

    /// Undo a `create` that could not be completed
    pub(crate) fn discard(&mut self, ticket_id: TicketId) {
        self.tickets.remove(&ticket_id);
        if ticket_id + 1 == self.next_id {
            self.next_id = ticket_id;
        }
    }

    pub fn find_open_ticket_by_spot(&self, spot_id: SpotId) -> Option<&Ticket> {
        self.tickets
            .values()
            .find(|ticket| ticket.is_open() && ticket.spot_id == spot_id)
    }

    pub fn find_open_ticket_by_plate(&self, license_plate: &str) -> Option<&Ticket> {
        let license_plate = license_plate.trim();
        self.tickets
            .values()
            .find(|ticket| ticket.is_open() && ticket.license_plate == license_plate)
    }

    pub fn get(&self, ticket_id: TicketId) -> Option<&Ticket> {
        self.tickets.get(&ticket_id)
    }

    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    pub fn open_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values().filter(|ticket| ticket.is_open())
    }

    pub fn open_count(&self) -> usize {
        self.open_tickets().count()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn clear(&mut self) {
        self.tickets.clear();
        self.next_id = 1;
    }
}

impl Default for TicketLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("License plate must not be empty")]
    InvalidLicensePlate,

    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    #[error("Ticket already closed: {0}")]
    TicketAlreadyClosed(TicketId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_ticket_lifecycle() {
        let mut ledger = TicketLedger::new();
        let entry = Utc::now();

        let id = ledger.create("AB-123", false, 41, entry).unwrap();
        assert_eq!(id, 1);
        assert_eq!(ledger.open_count(), 1);

        let open = ledger.find_open_ticket_by_plate("AB-123").unwrap();
        assert_eq!(open.spot_id, 41);
        assert_eq!(open.entry_time, entry);
        assert_eq!(ledger.find_open_ticket_by_spot(41).unwrap().id, id);

        let exit = entry + Duration::minutes(90);
        let closed = ledger.close(id, exit, 400).unwrap();
        assert_eq!(closed.exit_time, Some(exit));
        assert_eq!(closed.cost_cents, 400);

        assert!(ledger.find_open_ticket_by_plate("AB-123").is_none());
        assert!(ledger.find_open_ticket_by_spot(41).is_none());
        assert_eq!(ledger.open_count(), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_invalid_operations() {
        let mut ledger = TicketLedger::new();
        let now = Utc::now();

        assert_eq!(ledger.create("", false, 0, now), Err(LedgerError::InvalidLicensePlate));
        assert_eq!(ledger.create("   ", true, 0, now), Err(LedgerError::InvalidLicensePlate));
        assert_eq!(ledger.close(99, now, 0).unwrap_err(), LedgerError::TicketNotFound(99));

        let id = ledger.create("XY-9", true, 0, now).unwrap();
        ledger.close(id, now, 0).unwrap();
        assert_eq!(ledger.close(id, now, 0).unwrap_err(), LedgerError::TicketAlreadyClosed(id));
    }

    #[test]
    fn test_plate_is_trimmed() {
        let mut ledger = TicketLedger::new();
        ledger.create("  KA-77 ", false, 3, Utc::now()).unwrap();

        assert_eq!(ledger.get(1).unwrap().license_plate, "KA-77");
        assert!(ledger.find_open_ticket_by_plate("KA-77 ").is_some());
    }

    #[test]
    fn test_ids_continue_after_load() {
        let now = Utc::now();
        let tickets = vec![
            Ticket::issue(3, "A".to_string(), false, 0, now),
            Ticket::issue(8, "B".to_string(), false, 1, now),
        ];
        let mut ledger = TicketLedger::from_tickets(tickets);

        assert_eq!(ledger.create("C", false, 2, now).unwrap(), 9);
    }

    #[test]
    fn test_discard_and_reopen_rollback() {
        let mut ledger = TicketLedger::new();
        let now = Utc::now();

        let id = ledger.create("AB-1", false, 0, now).unwrap();
        ledger.discard(id);
        assert!(ledger.is_empty());
        assert_eq!(ledger.create("AB-1", false, 0, now).unwrap(), id);

        ledger.close(id, now, 250).unwrap();
        ledger.reopen(id);
        let ticket = ledger.get(id).unwrap();
        assert!(ticket.is_open());
        assert_eq!(ticket.cost_cents, 0);
    }
}
