pub mod console;
pub mod error;
pub mod state;

pub use error::ConsoleError;
pub use state::AppState;
