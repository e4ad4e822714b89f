use crate::error::ConsoleError;
use crate::state::AppState;
use gigapark_core::garage::{FAREWELL_TEXT, WELCOME_TEXT};
use gigapark_core::pricing::format_cents;
use gigapark_core::status_line;
use std::fmt::Write;

pub const HELP_TEXT: &str = "\
Commands:
  in <plate>     drive in as a regular parker
  in! <plate>    drive in as a permanent parker
  out <plate>    drive out
  free           show free spots
  spots          list all spots
  tickets        list all tickets
  dump           print spots and tickets as JSON
  reset          return the garage to its factory state
  help           show this text
  quit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DriveIn { plate: String, permanent: bool },
    DriveOut { plate: String },
    Free,
    Spots,
    Tickets,
    Dump,
    Reset,
    Help,
    Quit,
}

/// Parse one console line. Plates may contain spaces; an empty plate is
/// passed through so the garage reports it.
pub fn parse(line: &str) -> Result<Command, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ConsoleError::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "in" => Command::DriveIn { plate: rest.to_string(), permanent: false },
        "in!" => Command::DriveIn { plate: rest.to_string(), permanent: true },
        "out" => Command::DriveOut { plate: rest.to_string() },
        "free" => Command::Free,
        "spots" => Command::Spots,
        "tickets" => Command::Tickets,
        "dump" => Command::Dump,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

/// Run a command against the garage and render the display text
pub async fn execute(state: &AppState, command: Command) -> String {
    let garage = &state.garage;

    match command {
        Command::DriveIn { plate, permanent } => {
            let outcome = garage.drive_in(&plate, permanent).await;
            format!("{}\n{}", status_line(&outcome), garage.availability_text().await)
        }
        Command::DriveOut { plate } => {
            let outcome = garage.drive_out(&plate).await;
            format!("{}\n{}", status_line(&outcome), garage.availability_text().await)
        }
        Command::Free => format!(
            "{} ({} of {} spots unoccupied)",
            garage.availability_text().await,
            garage.free_count().await,
            garage.layout().await.capacity
        ),
        Command::Spots => render_spots(state).await,
        Command::Tickets => render_tickets(state).await,
        Command::Dump => match serde_json::to_string_pretty(&garage.snapshot().await) {
            Ok(json) => json,
            Err(err) => format!("Could not encode snapshot: {}", err),
        },
        Command::Reset => match garage.reset().await {
            Ok(()) => format!("Garage reset.\n{}", garage.availability_text().await),
            Err(err) => {
                tracing::error!("Reset failed: {}", err);
                "Reset failed, see log.".to_string()
            }
        },
        Command::Help => HELP_TEXT.to_string(),
        Command::Quit => FAREWELL_TEXT.to_string(),
    }
}

pub async fn banner(state: &AppState) -> String {
    format!("{}\n{}", WELCOME_TEXT, state.garage.availability_text().await)
}

async fn render_spots(state: &AppState) -> String {
    let snapshot = state.garage.snapshot().await;
    let mut out = String::from("SPOT  RESERVED  TICKET");
    for spot in &snapshot.spots {
        let ticket = spot
            .occupying_ticket
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let reserved = if spot.reserved_for_permanent { "yes" } else { "no" };
        let _ = write!(out, "\n{:>4}  {:<8}  {}", spot.id, reserved, ticket);
    }
    out
}

async fn render_tickets(state: &AppState) -> String {
    let snapshot = state.garage.snapshot().await;
    if snapshot.tickets.is_empty() {
        return "No tickets issued.".to_string();
    }

    let mut out = String::from("TICKET  PLATE       SPOT  PERM  ENTRY             EXIT              COST");
    for ticket in &snapshot.tickets {
        let exit = ticket
            .exit_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(
            out,
            "\n{:>6}  {:<10}  {:>4}  {:<4}  {}  {:<16}  {}",
            ticket.id,
            ticket.license_plate,
            ticket.spot_id,
            if ticket.is_permanent { "yes" } else { "no" },
            ticket.entry_time.format("%Y-%m-%d %H:%M"),
            exit,
            format_cents(ticket.cost_cents)
        );
    }
    out
}
