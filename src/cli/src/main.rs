//! `hass-skill`: drive a Home Assistant hub with the same intents a voice
//! front end would send.

use std::path::PathBuf;

use anyhow::Result;
use application::HomeAssistantSkill;
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::{BrightnessDirection, Intent};
use infrastructure::HubSettings;
use presentation::output::{print_fallback, print_outcome};
use presentation::DialogRenderer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hass-skill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Control Home Assistant with spoken-style commands")]
struct Cli {
    /// Settings file (TOML or JSON); HASS_* variables fill the gaps
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory of `.dialog` files overriding the built-in sentences
    #[arg(long, global = true)]
    dialogs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a device on, off or toggle it
    Switch {
        /// on, off or toggle (localized verbs are accepted)
        action: String,
        /// Device name as you would say it
        entity: Vec<String>,
    },

    /// Set or adjust a light's brightness
    Brightness {
        #[command(subcommand)]
        command: BrightnessCommand,
    },

    /// Trigger an automation, script or scene
    Automation { entity: Vec<String> },

    /// Read a sensor
    Sensor { entity: Vec<String> },

    /// Locate a device tracker
    Tracker { entity: Vec<String> },

    /// Ask the hub's conversation agent
    Ask { utterance: Vec<String> },

    /// Check whether the hub has a component loaded
    Components {
        #[arg(default_value = "conversation")]
        name: String,
    },
}

#[derive(Subcommand)]
enum BrightnessCommand {
    /// Set an absolute percentage
    Set {
        /// Percentage between 0 and 100
        #[arg(short, long)]
        percent: String,
        entity: Vec<String>,
    },
    /// Brighten by a percentage (default 10)
    Up {
        #[arg(short, long)]
        percent: Option<String>,
        entity: Vec<String>,
    },
    /// Dim by a percentage (default 10)
    Down {
        #[arg(short, long)]
        percent: Option<String>,
        entity: Vec<String>,
    },
}

impl Commands {
    fn into_intent(self) -> Option<Intent> {
        let intent = match self {
            Commands::Switch { action, entity } => Intent::Switch {
                action,
                entity: entity.join(" "),
            },
            Commands::Brightness { command } => match command {
                BrightnessCommand::Set { percent, entity } => Intent::SetBrightness {
                    entity: entity.join(" "),
                    value: Some(percent),
                },
                BrightnessCommand::Up { percent, entity } => Intent::AdjustBrightness {
                    entity: entity.join(" "),
                    direction: BrightnessDirection::Increase,
                    value: percent,
                },
                BrightnessCommand::Down { percent, entity } => Intent::AdjustBrightness {
                    entity: entity.join(" "),
                    direction: BrightnessDirection::Decrease,
                    value: percent,
                },
            },
            Commands::Automation { entity } => Intent::Automation {
                entity: entity.join(" "),
            },
            Commands::Sensor { entity } => Intent::Sensor {
                entity: entity.join(" "),
            },
            Commands::Tracker { entity } => Intent::Tracker {
                entity: entity.join(" "),
            },
            Commands::Ask { .. } | Commands::Components { .. } => return None,
        };
        Some(intent)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = HubSettings::load(cli.config.as_deref())?;
    let renderer = match &cli.dialogs {
        Some(dir) => DialogRenderer::with_overrides(dir)?,
        None => DialogRenderer::default(),
    };
    let mut skill = HomeAssistantSkill::new(settings);

    match cli.command {
        Commands::Ask { utterance } => {
            let result = skill.handle_fallback(&utterance.join(" ")).await;
            print_fallback(&renderer, &result);
        }
        Commands::Components { name } => match skill.has_component(&name).await {
            Some(true) => println!("{} {}", "loaded".green(), name),
            Some(false) => println!("{} {}", "not loaded".yellow(), name),
            None => println!("{}", "Home Assistant is not configured".red()),
        },
        command => {
            if let Some(intent) = command.into_intent() {
                let outcome = skill.handle_intent(&intent).await;
                print_outcome(&renderer, &outcome);
            }
        }
    }

    skill.shutdown();
    Ok(())
}
