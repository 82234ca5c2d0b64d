//! Earshot CLI Application

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use earshot_app::bootstrap::{self, HostOptions};
use earshot_app::runtime::{self, HostMessage};
use earshot_core::domain::audio::BackendKind;
use earshot_core::domain::entities::UserId;
use earshot_core::domain::orchestrator::Orchestrator;
use earshot_core::domain::settings::RotateMode;
use earshot_infra::scenario::Scenario;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "earshot")]
#[command(about = "Positional audio for voice chat driven by game events", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory holding testsound.wav and the hrtf/ tables
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Voice-chat id of the local user
    #[arg(long, global = true, default_value_t = 1)]
    local_user: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a scripted game session
    Run {
        /// JSON file of timed events
        scenario: PathBuf,
    },
    /// Sweep the test sound around the listener
    TestSound {
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,

        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Show the current settings and the available HRTF data sets
    Settings,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    #[value(name = "built_in")]
    BuiltIn,
    #[value(name = "open_al")]
    OpenAl,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::BuiltIn => BackendKind::BuiltIn,
            BackendArg::OpenAl => BackendKind::OpenAl,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Stepped,
    Smooth,
}

impl From<ModeArg> for RotateMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Stepped => RotateMode::Stepped,
            ModeArg::Smooth => RotateMode::Smooth,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Earshot starting...");

    let game_source = match &cli.command {
        Command::Run { scenario } => Some(scenario.display().to_string()),
        _ => None,
    };
    let options = HostOptions {
        settings_path: cli.settings,
        data_dir: cli.data_dir,
        local_user: UserId::new(cli.local_user),
        game_source,
    };
    let host = bootstrap::assemble(&options).context("Failed to locate settings")?;

    match cli.command {
        Command::Run { scenario } => {
            let scenario = Scenario::load(&scenario)
                .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;
            run_scenario(host.orchestrator, scenario).await?;
            tracing::debug!(
                driver_calls = host.journal.len(),
                discarded = host.journal.discarded(),
                "Scenario replayed"
            );
        }
        Command::TestSound { backend, mode } => {
            let mut settings = host.orchestrator.settings().clone();
            if let Some(backend) = backend {
                settings.audio_backend = backend.into();
            }
            if let Some(mode) = mode {
                settings.test_rotate_mode = mode.into();
            }

            let (tx, rx) = mpsc::channel(16);
            let request = async move {
                let (reply, outcome) = oneshot::channel();
                tx.send(HostMessage::PlayTestSound { settings, reply })
                    .await
                    .context("Event loop stopped early")?;
                outcome.await.context("Test sound result lost")
            };
            let (_, outcome) = tokio::join!(runtime::run(host.orchestrator, rx), request);
            outcome?.context("Test sound failed")?;
            tracing::info!("Test sound finished");
        }
        Command::Settings => {
            let mut orchestrator = host.orchestrator;
            orchestrator.show_settings_ui()?;
        }
    }

    Ok(())
}

async fn run_scenario(
    orchestrator: Orchestrator,
    scenario: Scenario,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(64);
    let steps = scenario.into_steps();

    let feeder = tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        for step in steps {
            tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
            if tx.send(HostMessage::Event(step.event)).await.is_err() {
                break;
            }
        }
    });

    let orchestrator = runtime::run(orchestrator, rx).await;
    feeder.await.context("Scenario feeder panicked")?;
    tracing::info!(users = orchestrator.users().len(), "Scenario finished");
    Ok(())
}
