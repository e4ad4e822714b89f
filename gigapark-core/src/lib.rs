pub mod layout;
pub mod registry;
pub mod ledger;
pub mod pricing;
pub mod repository;
pub mod engine;
pub mod garage;

pub use layout::{GarageLayout, LayoutError, DEFAULT_BUFFER_THRESHOLD};
pub use registry::{RegistryError, SpotRegistry};
pub use ledger::{LedgerError, TicketLedger};
pub use pricing::{HourlyTariff, Tariff, TariffConfig};
pub use repository::{GarageStore, MemoryStore, StoreError};
pub use engine::{AllocationEngine, EngineError, StatusMessage};
pub use garage::{status_line, Garage, GarageSnapshot};
