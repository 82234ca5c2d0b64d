//! Inbound events raised by the game, the voice-chat client and the UI

use crate::domain::entities::UserId;
use crate::domain::geometry::Vector3;
use crate::domain::settings::Settings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    GameUserAdded { id: UserId },
    GameUserRemoved { id: UserId },
    UserMoved { id: UserId, position: Vector3 },
    CameraMoved { position: Vector3, direction: Vector3 },
    ChatUserAdded { id: UserId },
    ChatUserRemoved { id: UserId },
    PlaybackDeviceChanged,
    PlaybackVolumeChanged,
    SettingsSaved { settings: Settings },
    SettingsUiRequested,
    PluginHelpRequested,
}
