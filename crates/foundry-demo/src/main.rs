//! Terminal front end for the Aurora Foundry interaction core.
//!
//! Plays the part of the presentation layer: issues one command, then prints
//! every state change until the flow settles and all toasts have expired.

mod render;

use std::error::Error;
use std::future::Future;

use clap::{Parser, Subcommand};
use foundry_core::{DemoPreset, FoundryConfig, NotificationKind, Studio, UiEvent};
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Parser)]
#[command(name = "foundry-demo", version, about = "Drive the Aurora Foundry interaction core")]
struct Cli {
    /// Ignore any configured credential and use offline concepts
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type a prompt and generate a concept for it
    Generate { prompt: String },
    /// Run a landing-page demo: profile, pricing or alert
    Preset { name: DemoPreset },
    /// Show a notification: success, error, info or warning
    Toast {
        kind: NotificationKind,
        message: String,
    },
    /// Simulate signing in
    SignIn,
    /// Simulate saving the profile form
    SaveProfile,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = FoundryConfig::from_env();
    if cli.offline {
        config.api_key = None;
    }

    let studio = Studio::new(config)?;
    let mut rx = studio.subscribe();

    let flow_pending = match cli.command {
        Command::Generate { prompt } => {
            studio.sequencer().start(prompt);
            true
        }
        Command::Preset { name } => {
            studio.sequencer().start_preset(name);
            true
        }
        Command::Toast { kind, message } => {
            studio.notifications().enqueue(kind, message);
            false
        }
        Command::SignIn => {
            studio.sign_in().start();
            true
        }
        Command::SaveProfile => {
            studio.save_profile().start();
            true
        }
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    render_until_settled(&studio, &mut rx, flow_pending, interrupt).await;
    studio.shutdown();
    Ok(())
}

/// Print events until the flow settles and the toasts are gone, or until
/// `interrupt` resolves. The interrupt future lives across iterations.
async fn render_until_settled<F>(
    studio: &Studio,
    rx: &mut broadcast::Receiver<UiEvent>,
    mut flow_pending: bool,
    interrupt: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);

    loop {
        if !flow_pending && studio.notifications().is_empty() {
            break;
        }

        tokio::select! {
            received = rx.recv() => match received {
                Ok(event) => {
                    log::debug!("{}", event.name());
                    if let Some(line) = render::describe(&event) {
                        println!("{}", line);
                    }
                    if render::is_settled(&event) {
                        flow_pending = false;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Renderer lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut interrupt => {
                log::info!("Interrupted");
                break;
            }
        }
    }
}
