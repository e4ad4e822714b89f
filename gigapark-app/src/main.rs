use anyhow::Context;
use gigapark_app::{console, AppState, ConsoleError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gigapark_app=info,gigapark_core=info,gigapark_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = gigapark_store::Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting GigaPark with {} spots ({} permanent, buffer {})",
        config.garage.capacity,
        config.garage.permanent_spots,
        config.garage.buffer_threshold
    );

    let state = AppState::from_config(&config)?;
    println!("{}", console::banner(&state).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match console::parse(&line) {
            Ok(command) => command,
            Err(ConsoleError::Empty) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        let quit = command == console::Command::Quit;
        println!("{}", console::execute(&state, command).await);
        if quit {
            break;
        }
    }

    Ok(())
}
