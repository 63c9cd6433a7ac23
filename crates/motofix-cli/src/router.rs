//! Command routing logic for CLI

use crate::args::{Cli, Commands, RequestAction};
use crate::commands;
use crate::console::CliConsole;
use motofix_core::config::{self, DEFAULT_CONFIG_FILE, LoggingConfig};
use motofix_core::error::UserFriendlyError;
use motofix_core::events::LOGIN_ROUTE;
use motofix_sdk::{Event, MotofixClient, MotofixError};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let config_path = resolve_config_path(cli.config_file.as_deref());
    let config = config::load_config(config_path.as_deref())?;
    init_logging(&config.logging, cli.verbose);

    let console = CliConsole::new(cli.verbose);

    let command = match cli.command {
        Commands::Config { action } => {
            return commands::config::run(action, &config, config_path.as_deref(), &console);
        }
        command => command,
    };

    let client = MotofixClient::new(config)?;
    let mut events = client.subscribe();

    let result = run_command(&client, &console, command).await;

    report_events(&mut events, &console);

    if let Err(err) = &result {
        if let Some(motofix_err) = err.downcast_ref::<MotofixError>() {
            let friendly = UserFriendlyError::from(motofix_err);
            console.error(&format!("{}: {}", friendly.title, friendly.message));
            if let Some(suggestion) = friendly.suggestion {
                console.hint(&suggestion);
            }
            tracing::debug!("command failed: {}", motofix_err);
            std::process::exit(1);
        }
    }
    result
}

async fn run_command(
    client: &MotofixClient,
    console: &CliConsole,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Otp { phone } => commands::auth::otp(client, console, &phone).await,
        Commands::Login { phone, code, name } => {
            commands::auth::login(client, console, &phone, &code, name.as_deref()).await
        }
        Commands::Whoami { offline } => commands::auth::whoami(client, console, offline).await,
        Commands::Logout => commands::auth::logout(client, console).await,
        Commands::Request { action } => route_request(client, console, action).await,
        Commands::Geocode {
            latitude,
            longitude,
        } => commands::geocode::lookup(client, console, latitude, longitude).await,
        Commands::Config { .. } => unreachable!("config commands are handled before the client is built"),
    }
}

async fn route_request(
    client: &MotofixClient,
    console: &CliConsole,
    action: RequestAction,
) -> anyhow::Result<()> {
    match action {
        RequestAction::New {
            name,
            phone,
            location,
            issue,
            lat,
            lon,
            voice,
            photos,
            files,
        } => {
            let form = commands::requests::NewRequestArgs {
                name,
                phone,
                location,
                issue,
                position: lat.zip(lon),
                voice,
                photos,
                files,
            };
            commands::requests::create(client, console, form).await
        }
        RequestAction::List { json } => commands::requests::list(client, console, json).await,
        RequestAction::Status { id, status } => {
            commands::requests::set_status(client, console, &id, &status).await
        }
        RequestAction::Call { id } => commands::requests::call(client, console, &id).await,
        RequestAction::Watch { id, interval } => {
            commands::requests::watch(client, console, &id, interval).await
        }
    }
}

/// Explicit path, or `motofix.toml` in the working directory when present
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Show what the SDK reported while the command ran
fn report_events(events: &mut broadcast::Receiver<Event>, console: &CliConsole) {
    while let Ok(event) = events.try_recv() {
        match event {
            Event::SessionExpired => console.warn("Your session has expired."),
            Event::Navigate { route } if route == LOGIN_ROUTE => {
                console.hint("Sign in again: motofix otp <phone>, then motofix login <phone> <code>");
            }
            Event::Notice { message } => console.hint(&message),
            other => tracing::debug!(event = other.event_type(), "event"),
        }
    }
}
