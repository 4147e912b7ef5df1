//! VoxQuery application binary - composition root.
//!
//! Ties the overlay session to terminal stand-ins for the host UI:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the overlay session around a simulated recognizer
//! 4. Read commands from stdin and forward them to the session loop

mod cli;
mod commands;
mod console;
mod simulator;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use voxquery_core::config::VoxQueryConfig;
use voxquery_overlay::{
    CapabilityFactory, MessageCatalog, OverlayHandle, OverlaySession, OverlaySettings, OverlayUi,
    RecognitionCapability,
};

use cli::CliArgs;
use commands::{Command, HELP};
use console::{ConsoleNotifier, ConsoleView};
use simulator::{simulated_pair, Microphone};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

/// Forward one command. Returns `false` when the REPL should exit.
fn dispatch(command: Command, handle: &OverlayHandle, microphone: &Microphone) -> bool {
    let sent = match command {
        Command::Toggle => handle.toggle(),
        Command::Listen => handle.start_listening(),
        Command::Language(code) => handle.set_language(code),
        Command::Say(text) => {
            if !microphone.say(&text) {
                println!("(nobody is listening)");
            }
            Ok(())
        }
        Command::Fail(code) => {
            if !microphone.fail(&code) {
                println!("(nobody is listening)");
            }
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Empty => Ok(()),
        Command::Unknown(line) => {
            println!("unknown command: {line} (try `help`)");
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(e) = sent {
        tracing::error!(error = %e, "Overlay session is gone");
        return false;
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config, then tracing at the configured level.
    let config_file = args.resolve_config_path();
    let loaded = VoxQueryConfig::load_if_present(&config_file);
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => VoxQueryConfig::default(),
    };
    init_tracing(&args.resolve_log_level(&config.general.log_level));

    tracing::info!("Starting VoxQuery v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(Some(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Ok(None) => tracing::debug!(path = %config_file.display(), "No config file, using defaults"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }
    args.apply_overrides(&mut config);

    // Overlay session.
    let settings = OverlaySettings::from_config(&config);
    let (recognizer, microphone) = simulated_pair();
    let factory: CapabilityFactory = if args.no_capability {
        Box::new(|| Ok(None))
    } else {
        Box::new(move || Ok(Some(Box::new(recognizer) as Box<dyn RecognitionCapability>)))
    };
    let ui = OverlayUi::new(
        Box::new(MessageCatalog::new()),
        Box::new(ConsoleNotifier),
        Box::new(ConsoleView::default()),
    );
    let (session, handle) = OverlaySession::new(factory, ui, settings);
    let session_task = tokio::spawn(session.run());

    println!("{HELP}");

    // REPL.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !dispatch(Command::parse(&line), &handle, &microphone) {
            break;
        }
    }

    if let Err(e) = handle.shutdown() {
        tracing::debug!(error = %e, "Session already stopped");
    }
    let report = session_task.await?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    tracing::info!("VoxQuery shutdown complete");
    Ok(())
}
