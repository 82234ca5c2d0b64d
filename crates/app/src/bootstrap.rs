//! Assembly of an orchestrator over the headless collaborators

use earshot_core::domain::audio::adapter::AudioAdapter;
use earshot_core::domain::entities::UserId;
use earshot_core::domain::orchestrator::Orchestrator;
use earshot_core::domain::registry::{AdapterRegistry, BackendTable};
use earshot_core::domain::settings::{self, SettingsStore};
use earshot_infra::audio::{DriverJournal, DriverRole, HeadlessDriver};
use earshot_infra::scenario::ScriptedGame;
use earshot_infra::settings::TomlSettingsFile;
use earshot_infra::ui::ConsoleUi;
use earshot_infra::voice::StaticVoiceChat;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Settings file; the platform default when unset
    pub settings_path: Option<PathBuf>,
    /// Directory holding `testsound.wav` and the `hrtf/` tables
    pub data_dir: PathBuf,
    pub local_user: UserId,
    /// Session feeding game events, for logs
    pub game_source: Option<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            settings_path: None,
            data_dir: PathBuf::from("data"),
            local_user: UserId::new(1),
            game_source: None,
        }
    }
}

/// Orchestrator plus the handles the host keeps on its collaborators
#[derive(Debug)]
pub struct Host {
    pub orchestrator: Orchestrator,
    pub voice_chat: StaticVoiceChat,
    pub journal: DriverJournal,
}

/// Build a host persisting settings to the TOML file named by `options`
pub fn assemble(options: &HostOptions) -> settings::Result<Host> {
    let path = match &options.settings_path {
        Some(path) => path.clone(),
        None => TomlSettingsFile::default_path()?,
    };
    info!(path = %path.display(), "Using settings file");
    Ok(assemble_with_store(options, Box::new(TomlSettingsFile::new(path))))
}

pub fn assemble_with_store(options: &HostOptions, store: Box<dyn SettingsStore>) -> Host {
    let journal = DriverJournal::new();
    let voice_chat = StaticVoiceChat::new(options.local_user);

    let adapters = |role: DriverRole| {
        BackendTable::from_fn(|kind| {
            let driver = HeadlessDriver::new(kind, role, &options.data_dir, journal.clone());
            AudioAdapter::new(kind, Box::new(driver), &options.data_dir)
        })
    };
    let registry = AdapterRegistry::new(
        adapters(DriverRole::Live),
        adapters(DriverRole::Test),
        Box::new(voice_chat.clone()),
        Box::new(
            options
                .game_source
                .as_deref()
                .map_or_else(ScriptedGame::detached, ScriptedGame::new),
        ),
        Box::new(ConsoleUi::new()),
    );

    Host {
        orchestrator: Orchestrator::new(store, registry),
        voice_chat,
        journal,
    }
}
