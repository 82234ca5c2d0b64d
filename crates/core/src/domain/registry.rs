//! Adapter tables keyed by [`BackendKind`]
//!
//! Every backend kind has exactly one live adapter (rendering to the user's
//! output device) and one test adapter (used only for the test sweep).

use crate::domain::audio::adapter::AudioAdapter;
use crate::domain::audio::BackendKind;
use crate::domain::collaborators::{GameData, SettingsUi, VoiceChat};
use std::fmt;

/// One value per backend kind, looked up exhaustively
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendTable<T> {
    built_in: T,
    open_al: T,
}

impl<T> BackendTable<T> {
    pub fn new(built_in: T, open_al: T) -> Self {
        Self { built_in, open_al }
    }

    /// Build a table by calling `f` once per kind, in [`BackendKind::ALL`] order
    pub fn from_fn(mut f: impl FnMut(BackendKind) -> T) -> Self {
        let built_in = f(BackendKind::BuiltIn);
        let open_al = f(BackendKind::OpenAl);
        Self { built_in, open_al }
    }

    pub fn get(&self, kind: BackendKind) -> &T {
        match kind {
            BackendKind::BuiltIn => &self.built_in,
            BackendKind::OpenAl => &self.open_al,
        }
    }

    pub fn get_mut(&mut self, kind: BackendKind) -> &mut T {
        match kind {
            BackendKind::BuiltIn => &mut self.built_in,
            BackendKind::OpenAl => &mut self.open_al,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BackendKind, &T)> {
        [
            (BackendKind::BuiltIn, &self.built_in),
            (BackendKind::OpenAl, &self.open_al),
        ]
        .into_iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        [&mut self.built_in, &mut self.open_al].into_iter()
    }
}

/// Owned set of adapter handles used by the orchestrator
pub struct AdapterRegistry {
    pub live: BackendTable<AudioAdapter>,
    pub test: BackendTable<AudioAdapter>,
    pub voice_chat: Box<dyn VoiceChat>,
    pub game_data: Box<dyn GameData>,
    pub ui: Box<dyn SettingsUi>,
}

impl AdapterRegistry {
    pub fn new(
        live: BackendTable<AudioAdapter>,
        test: BackendTable<AudioAdapter>,
        voice_chat: Box<dyn VoiceChat>,
        game_data: Box<dyn GameData>,
        ui: Box<dyn SettingsUi>,
    ) -> Self {
        Self {
            live,
            test,
            voice_chat,
            game_data,
            ui,
        }
    }

    /// Every live adapter followed by every test adapter
    pub fn all_adapters_mut(&mut self) -> impl Iterator<Item = &mut AudioAdapter> {
        self.live.values_mut().chain(self.test.values_mut())
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("live", &self.live)
            .field("test", &self.test)
            .field("game_data", &self.game_data.source())
            .finish_non_exhaustive()
    }
}
