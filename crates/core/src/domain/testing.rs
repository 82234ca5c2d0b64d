//! In-memory collaborators for unit tests

use crate::domain::audio::adapter::AudioAdapter;
use crate::domain::audio::{AudioDriver, BackendKind, DriverError, Result};
use crate::domain::collaborators::{GameData, SettingsUi, SettingsView, VoiceChat};
use crate::domain::entities::UserId;
use crate::domain::geometry::Vector3;
use crate::domain::registry::{AdapterRegistry, BackendTable};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

#[derive(Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub enabled: bool,
    pub fail_on: Option<&'static str>,
    pub hrtf_names: Vec<String>,
}

/// Driver that records every call as a string such as `"remove_user 5"`
#[derive(Clone, Default)]
pub struct FakeDriver(pub Rc<RefCell<FakeState>>);

impl FakeDriver {
    pub fn with_hrtf_names(names: &[&str]) -> Self {
        let driver = Self::default();
        driver.0.borrow_mut().hrtf_names = names.iter().map(|n| n.to_string()).collect();
        driver
    }

    fn record(&self, call: &'static str, detail: String) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.calls.push(format!("{call}{detail}"));
        if state.fail_on == Some(call) {
            return Err(DriverError::new(call, "injected"));
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    pub fn fail_on(&self, call: &'static str) {
        self.0.borrow_mut().fail_on = Some(call);
    }

    pub fn enabled(&self) -> bool {
        self.0.borrow().enabled
    }
}

impl AudioDriver for FakeDriver {
    fn position_user(&mut self, id: UserId, position: Vector3) -> Result<()> {
        self.record("position_user", format!(" {id} {position}"))
    }

    fn remove_user(&mut self, id: UserId) -> Result<()> {
        self.record("remove_user", format!(" {id}"))
    }

    fn position_camera(&mut self, _position: Vector3, _forward: Vector3, up: Vector3) -> Result<()> {
        self.record("position_camera", format!(" up={up}"))
    }

    fn play_test_sound(&mut self, asset: &Path) -> Result<()> {
        self.record("play_test_sound", format!(" {}", asset.display()))
    }

    fn position_test_sound(&mut self, _position: Vector3) -> Result<()> {
        self.record("position_test_sound", String::new())
    }

    fn stop_test_sound(&mut self) -> Result<()> {
        self.record("stop_test_sound", String::new())
    }

    fn set_playback_device_name(&mut self, name: &str) -> Result<()> {
        self.record("set_playback_device_name", format!(" {name}"))
    }

    fn set_playback_volume(&mut self, volume: f32) -> Result<()> {
        self.record("set_playback_volume", format!(" {volume}"))
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.0.borrow_mut().enabled = enabled;
        self.record("set_enabled", format!(" {enabled}"))
    }

    fn is_enabled(&self) -> bool {
        self.0.borrow().enabled
    }

    fn set_hrtf_enabled(&mut self, enabled: bool) -> Result<()> {
        self.record("set_hrtf_enabled", format!(" {enabled}"))
    }

    fn set_hrtf_data_set(&mut self, name: &str) -> Result<()> {
        self.record("set_hrtf_data_set", format!(" {name}"))
    }

    fn hrtf_data_file_names(&self) -> Result<Vec<String>> {
        Ok(self.0.borrow().hrtf_names.clone())
    }

    fn set_logging_level(&mut self, level: i32) -> Result<()> {
        self.record("set_logging_level", format!(" {level}"))
    }
}

#[derive(Debug, Clone)]
pub struct FakeVoiceChatState {
    pub my_id: UserId,
    pub device: String,
    pub volume: f32,
}

#[derive(Clone)]
pub struct FakeVoiceChat(pub Rc<RefCell<FakeVoiceChatState>>);

impl FakeVoiceChat {
    pub fn new(my_id: u16) -> Self {
        Self(Rc::new(RefCell::new(FakeVoiceChatState {
            my_id: UserId::new(my_id),
            device: "Speakers".to_string(),
            volume: 1.0,
        })))
    }
}

impl VoiceChat for FakeVoiceChat {
    fn my_user_id(&self) -> UserId {
        self.0.borrow().my_id
    }

    fn playback_device_name(&self) -> String {
        self.0.borrow().device.clone()
    }

    fn playback_volume(&self) -> f32 {
        self.0.borrow().volume
    }
}

/// Game handle reporting a fixed session name
#[derive(Clone)]
pub struct FakeGameData(pub &'static str);

impl GameData for FakeGameData {
    fn source(&self) -> String {
        self.0.to_string()
    }
}

/// UI that remembers what it was asked to show
#[derive(Clone, Default)]
pub struct FakeUi(pub Rc<RefCell<Vec<(String, SettingsView)>>>);

impl SettingsUi for FakeUi {
    fn show_settings_ui(&mut self, view: &SettingsView) {
        self.0.borrow_mut().push(("settings".to_string(), view.clone()));
    }

    fn show_plugin_help(&mut self, url: &str, view: &SettingsView) {
        self.0.borrow_mut().push((url.to_string(), view.clone()));
    }
}

/// Registry whose drivers can be inspected afterwards
pub struct Harness {
    pub live: BackendTable<FakeDriver>,
    pub test: BackendTable<FakeDriver>,
    pub voice_chat: FakeVoiceChat,
    pub ui: FakeUi,
}

impl Harness {
    pub const MY_ID: u16 = 1;
    pub const GAME_SOURCE: &'static str = "fake-session";

    pub fn new() -> (Self, AdapterRegistry) {
        let live = BackendTable::from_fn(|kind| match kind {
            BackendKind::BuiltIn => FakeDriver::default(),
            BackendKind::OpenAl => FakeDriver::with_hrtf_names(&["default-44100", "default-48000"]),
        });
        let test = BackendTable::from_fn(|_| FakeDriver::default());
        let voice_chat = FakeVoiceChat::new(Self::MY_ID);
        let ui = FakeUi::default();

        let registry = AdapterRegistry::new(
            BackendTable::from_fn(|kind| {
                AudioAdapter::new(kind, Box::new(live.get(kind).clone()), "data")
            }),
            BackendTable::from_fn(|kind| {
                AudioAdapter::new(kind, Box::new(test.get(kind).clone()), "data")
            }),
            Box::new(voice_chat.clone()),
            Box::new(FakeGameData(Self::GAME_SOURCE)),
            Box::new(ui.clone()),
        );

        (
            Self {
                live,
                test,
                voice_chat,
                ui,
            },
            registry,
        )
    }

    pub fn clear(&self) {
        for (_, driver) in self.live.iter().chain(self.test.iter()) {
            driver.clear();
        }
    }
}
