//! Ports to the voice-chat client, the game and the settings UI

use crate::domain::entities::UserId;
use crate::domain::settings::Settings;

/// Where users can read about the positional audio plugin
pub const PLUGIN_HELP_URL: &str =
    "https://github.com/jhakonen/wot-teamspeak-mod/wiki/TeamSpeak-Plugins#tessumod-plugin";

/// The voice-chat client, queried for the local user and output settings
pub trait VoiceChat {
    /// Id of the user running this client
    fn my_user_id(&self) -> UserId;

    fn playback_device_name(&self) -> String;

    fn playback_volume(&self) -> f32;
}

/// The game feeding user and camera events.
///
/// Events reach the orchestrator through [`Orchestrator::handle`]; this handle
/// only describes where they come from.
///
/// [`Orchestrator::handle`]: crate::domain::orchestrator::Orchestrator::handle
pub trait GameData {
    /// Session the events are read from, for logs
    fn source(&self) -> String;
}

/// Snapshot handed to the UI when it is opened
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsView {
    pub settings: Settings,
    /// Union of the HRTF data sets offered by the live backends
    pub hrtf_data_names: Vec<String>,
}

/// The settings dialog and help viewer
pub trait SettingsUi {
    fn show_settings_ui(&mut self, view: &SettingsView);

    fn show_plugin_help(&mut self, url: &str, view: &SettingsView);
}
