#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("Empty input")]
    Empty,

    #[error("Unknown command: {0} (type `help`)")]
    UnknownCommand(String),
}
