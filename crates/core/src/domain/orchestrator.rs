//! Business rules binding the game, the voice chat and the audio backends
//!
//! The [`Orchestrator`] is the only owner of the user, camera and settings
//! state. It consumes [`Event`]s from the external systems, updates that
//! state, and fans commands out to every live [`AudioAdapter`]. It runs on a
//! single control flow and never blocks.
//!
//! Only users that are [paired](User::paired) ever reach an audio backend;
//! a user that stops being paired is removed from every backend it was
//! placed on before its flags are updated.

pub mod storage;

use crate::domain::audio::adapter::{AudioAdapter, TestSoundResult, TestSoundState};
use crate::domain::audio::{Result, TestSoundError};
use crate::domain::collaborators::{SettingsView, PLUGIN_HELP_URL};
use crate::domain::entities::{Camera, User, UserId};
use crate::domain::event::Event;
use crate::domain::geometry::Vector3;
use crate::domain::registry::AdapterRegistry;
use crate::domain::settings::{Settings, SettingsStore};
use std::time::Instant;
use storage::{SettingsStorage, UserStorage};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, trace, warn};

#[derive(Debug)]
pub struct Orchestrator {
    users: UserStorage,
    camera: Camera,
    settings: SettingsStorage,
    adapters: AdapterRegistry,
    initialized: bool,
}

impl Orchestrator {
    pub fn new(settings_store: Box<dyn SettingsStore>, adapters: AdapterRegistry) -> Self {
        Self {
            users: UserStorage::new(),
            camera: Camera::default(),
            settings: SettingsStorage::new(settings_store),
            adapters,
            initialized: false,
        }
    }

    pub fn users(&self) -> &UserStorage {
        &self.users
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// Route an inbound event to the matching operation
    pub fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::GameUserAdded { id } => self.add_game_user(id),
            Event::GameUserRemoved { id } => self.remove_game_user(id),
            Event::UserMoved { id, position } => self.position_user(id, position),
            Event::CameraMoved {
                position,
                direction,
            } => self.position_camera(position, direction),
            Event::ChatUserAdded { id } => self.add_chat_user(id),
            Event::ChatUserRemoved { id } => self.remove_chat_user(id),
            Event::PlaybackDeviceChanged => self.change_playback_device(),
            Event::PlaybackVolumeChanged => self.change_playback_volume(),
            Event::SettingsSaved { settings } => self.save_settings(settings),
            Event::SettingsUiRequested => self.show_settings_ui(),
            Event::PluginHelpRequested => self.show_plugin_help(),
        }
    }

    /// Push the stored settings to the backends and enable the configured
    /// one. Runs once; later calls are ignored.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            warn!("Orchestrator already initialized");
            return Ok(());
        }
        self.initialized = true;

        let settings = self.settings.get().clone();
        info!(
            positioning = settings.positioning_enabled,
            backend = %settings.audio_backend,
            game = %self.adapters.game_data.source(),
            "Initializing audio backends"
        );
        if settings.positioning_enabled {
            self.update_playback_device()?;
            self.update_playback_volume()?;
            for adapter in self.adapters.live.values_mut() {
                apply_output_settings(adapter, &settings)?;
            }
            self.adapters
                .live
                .get_mut(settings.audio_backend)
                .set_enabled(true)?;
        }
        Ok(())
    }

    /// Move a known user; unknown ids are ignored since movement may be
    /// reported before the user is sighted
    pub fn position_user(&mut self, id: UserId, position: Vector3) -> Result<()> {
        let Some(mut user) = self.users.get(id) else {
            trace!(user = %id, "Ignoring position of unknown user");
            return Ok(());
        };
        user.position = position;
        self.users.set(user.clone());
        self.position_on_backends(&user)
    }

    pub fn position_camera(&mut self, position: Vector3, direction: Vector3) -> Result<()> {
        self.camera = Camera::new(position, direction);
        let camera = self.camera;
        for adapter in self.adapters.live.values_mut() {
            adapter.position_camera(&camera)?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn add_game_user(&mut self, id: UserId) -> Result<()> {
        if self.adapters.voice_chat.my_user_id() == id {
            debug!("Ignoring local user");
            return Ok(());
        }
        let mut user = self.users.get(id).unwrap_or_else(|| User::new(id));
        user.in_game = true;
        self.users.set(user.clone());
        self.position_on_backends(&user)
    }

    #[instrument(skip(self))]
    pub fn remove_game_user(&mut self, id: UserId) -> Result<()> {
        let Some(mut user) = self.users.get(id) else {
            return Ok(());
        };
        // Pairing must be judged on the flags before the change
        let removed = self.remove_from_backends(&user);
        user.in_game = false;
        self.store_or_forget(user);
        removed
    }

    #[instrument(skip(self))]
    pub fn add_chat_user(&mut self, id: UserId) -> Result<()> {
        let mut user = self.users.get(id).unwrap_or_else(|| User::new(id));
        user.in_chat = true;
        self.users.set(user.clone());
        self.position_on_backends(&user)
    }

    #[instrument(skip(self))]
    pub fn remove_chat_user(&mut self, id: UserId) -> Result<()> {
        let Some(mut user) = self.users.get(id) else {
            return Ok(());
        };
        let removed = self.remove_from_backends(&user);
        user.in_chat = false;
        self.store_or_forget(user);
        removed
    }

    pub fn change_playback_device(&mut self) -> Result<()> {
        self.update_playback_device()
    }

    pub fn change_playback_volume(&mut self) -> Result<()> {
        self.update_playback_volume()
    }

    /// Replace the settings and move the enabled backend accordingly.
    ///
    /// With positioning enabled exactly the selected live backend ends up
    /// enabled; with positioning disabled none is.
    #[instrument(skip(self, settings))]
    pub fn save_settings(&mut self, settings: Settings) -> Result<()> {
        let original = self.settings.get().clone();
        self.settings.set(settings.clone());
        info!(
            positioning = settings.positioning_enabled,
            backend = %settings.audio_backend,
            "Settings saved"
        );

        if settings.positioning_enabled {
            if original.audio_backend != settings.audio_backend {
                self.adapters
                    .live
                    .get_mut(original.audio_backend)
                    .set_enabled(false)?;
            }
            for adapter in self.adapters.live.values_mut() {
                apply_output_settings(adapter, &settings)?;
            }
            self.adapters
                .live
                .get_mut(settings.audio_backend)
                .set_enabled(true)?;
        } else if original.positioning_enabled {
            self.adapters
                .live
                .get_mut(original.audio_backend)
                .set_enabled(false)?;
        }
        Ok(())
    }

    /// Sweep the test sound on the test adapter of `settings.audio_backend`,
    /// configured with `settings` rather than the saved ones.
    ///
    /// The returned receiver resolves exactly once with the outcome of the run.
    /// While a run is active on that adapter the request is rejected with
    /// [`TestSoundError::InProgress`] and the driver is left untouched.
    #[instrument(skip(self, settings, now), fields(backend = %settings.audio_backend))]
    pub fn play_test_audio_with_settings(
        &mut self,
        settings: &Settings,
        now: Instant,
    ) -> oneshot::Receiver<TestSoundResult> {
        let (sink, receiver) = oneshot::channel();
        let adapter = self.adapters.test.get_mut(settings.audio_backend);

        if adapter.test_sound_state() != TestSoundState::Idle {
            warn!("Test sound already playing");
            if sink.send(Err(TestSoundError::InProgress)).is_err() {
                trace!("Test sound receiver already dropped");
            }
            return receiver;
        }

        let configured = apply_output_settings(adapter, settings)
            .and_then(|()| adapter.set_enabled(settings.positioning_enabled));
        match configured {
            Ok(()) => adapter.play_test_sound(settings.test_rotate_mode, sink, now),
            Err(e) => {
                warn!(error = %e, "Failed to configure test backend");
                if sink.send(Err(TestSoundError::Driver(e))).is_err() {
                    trace!("Test sound receiver already dropped");
                }
            }
        }
        receiver
    }

    /// Stop every running test sound; their results are still delivered
    pub fn stop_test_audio(&mut self) {
        for adapter in self.adapters.test.values_mut() {
            adapter.stop_test_sound();
        }
    }

    /// Advance running test sounds to `now`
    pub fn poll_test_sounds(&mut self, now: Instant) {
        for adapter in self.adapters.all_adapters_mut() {
            adapter.poll_test_sound(now);
        }
    }

    /// Earliest instant at which [`poll_test_sounds`](Self::poll_test_sounds)
    /// has work to do
    pub fn next_test_sound_deadline(&self) -> Option<Instant> {
        self.adapters
            .live
            .iter()
            .chain(self.adapters.test.iter())
            .filter_map(|(_, adapter)| adapter.test_sound_deadline())
            .min()
    }

    pub fn show_settings_ui(&mut self) -> Result<()> {
        let view = self.settings_view()?;
        self.adapters.ui.show_settings_ui(&view);
        Ok(())
    }

    pub fn show_plugin_help(&mut self) -> Result<()> {
        let view = self.settings_view()?;
        self.adapters.ui.show_plugin_help(PLUGIN_HELP_URL, &view);
        Ok(())
    }

    /// Stop test sounds and disable the live backends
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) -> Result<()> {
        for adapter in self.adapters.all_adapters_mut() {
            adapter.stop_test_sound();
        }
        for adapter in self.adapters.live.values_mut() {
            adapter.set_enabled(false)?;
        }
        info!("Audio backends shut down");
        Ok(())
    }

    fn settings_view(&self) -> Result<SettingsView> {
        let mut hrtf_data_names: Vec<String> = Vec::new();
        for (_, adapter) in self.adapters.live.iter() {
            for name in adapter.hrtf_data_file_names()? {
                if !hrtf_data_names.contains(&name) {
                    hrtf_data_names.push(name);
                }
            }
        }
        Ok(SettingsView {
            settings: self.settings.get().clone(),
            hrtf_data_names,
        })
    }

    fn store_or_forget(&mut self, user: User) {
        if user.exists() {
            self.users.set(user);
        } else {
            self.users.remove(user.id);
        }
    }

    fn position_on_backends(&mut self, user: &User) -> Result<()> {
        if !user.paired() {
            return Ok(());
        }
        for adapter in self.adapters.live.values_mut() {
            adapter.position_user(user)?;
        }
        Ok(())
    }

    fn remove_from_backends(&mut self, user: &User) -> Result<()> {
        if !user.paired() {
            return Ok(());
        }
        for adapter in self.adapters.live.values_mut() {
            adapter.remove_user(user)?;
        }
        Ok(())
    }

    fn update_playback_device(&mut self) -> Result<()> {
        let name = self.adapters.voice_chat.playback_device_name();
        debug!(device = %name, "Updating playback device");
        for adapter in self.adapters.all_adapters_mut() {
            adapter.set_playback_device_name(&name)?;
        }
        Ok(())
    }

    fn update_playback_volume(&mut self) -> Result<()> {
        let volume = self.adapters.voice_chat.playback_volume();
        debug!(volume, "Updating playback volume");
        for adapter in self.adapters.all_adapters_mut() {
            adapter.set_playback_volume(volume)?;
        }
        Ok(())
    }
}

fn apply_output_settings(adapter: &mut AudioAdapter, settings: &Settings) -> Result<()> {
    adapter.set_hrtf_enabled(settings.hrtf_enabled)?;
    adapter.set_hrtf_data_set(&settings.hrtf_data_set)?;
    adapter.set_logging_level(settings.audio_logging_level)
}
