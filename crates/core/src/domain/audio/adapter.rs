//! Per-backend facade over an [`AudioDriver`]
//!
//! An adapter forwards user, camera and output-setting changes to its driver
//! and runs the test-sound protocol:
//!
//! ```text
//! Idle --start--> Started --point--> Positioning --point--> Positioning
//!                    |                    |
//!                    +---- failure -------+------> Idle   (failure delivered)
//! Positioning --finished--> Idle                           (success delivered)
//! ```
//!
//! The caller's result sink is held in a single slot that is emptied on
//! first delivery, so every run reports exactly once.

use crate::domain::audio::rotator::{PositionRotator, RotatorEvent};
use crate::domain::audio::{AudioDriver, BackendKind, DriverError, Result, TestSoundError};
use crate::domain::entities::{Camera, User, UserId};
use crate::domain::geometry::Vector3;
use crate::domain::settings::RotateMode;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, error, trace, warn};

/// File name of the test-sound asset inside the data directory
pub const TEST_SOUND_FILE: &str = "testsound.wav";

pub type TestSoundResult = std::result::Result<(), TestSoundError>;

/// Single-use channel that receives the outcome of a test-sound run
pub type TestSoundSink = oneshot::Sender<TestSoundResult>;

/// Test-sound protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSoundState {
    Idle,
    Started,
    Positioning,
}

pub struct AudioAdapter {
    kind: BackendKind,
    driver: Box<dyn AudioDriver>,
    rotator: PositionRotator,
    test_sound_path: PathBuf,
    user_ids: BTreeSet<UserId>,
    state: TestSoundState,
    pending: Option<TestSoundSink>,
}

impl AudioAdapter {
    pub fn new(kind: BackendKind, driver: Box<dyn AudioDriver>, data_dir: impl AsRef<Path>) -> Self {
        Self {
            kind,
            driver,
            rotator: PositionRotator::new(),
            test_sound_path: data_dir.as_ref().join(TEST_SOUND_FILE),
            user_ids: BTreeSet::new(),
            state: TestSoundState::Idle,
            pending: None,
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Users currently placed on this backend
    pub fn positioned_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.user_ids.iter().copied()
    }

    pub fn test_sound_state(&self) -> TestSoundState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.driver.is_enabled()
    }

    pub fn position_user(&mut self, user: &User) -> Result<()> {
        trace!(backend = %self.kind, user = %user.id, position = %user.position, "Positioning user");
        self.driver.position_user(user.id, user.position)?;
        self.user_ids.insert(user.id);
        Ok(())
    }

    pub fn remove_user(&mut self, user: &User) -> Result<()> {
        debug!(backend = %self.kind, user = %user.id, "Removing user");
        self.driver.remove_user(user.id)?;
        self.user_ids.remove(&user.id);
        Ok(())
    }

    /// Move the listener; skipped when no up vector can be derived
    pub fn position_camera(&mut self, camera: &Camera) -> Result<()> {
        let Some(up) = camera.up() else {
            trace!(backend = %self.kind, direction = %camera.direction, "Skipping camera with vertical direction");
            return Ok(());
        };
        self.driver
            .position_camera(camera.position, camera.direction, up)
    }

    pub fn set_playback_device_name(&mut self, name: &str) -> Result<()> {
        self.driver.set_playback_device_name(name)
    }

    pub fn set_playback_volume(&mut self, volume: f32) -> Result<()> {
        self.driver.set_playback_volume(volume)
    }

    /// Enable or disable the driver; calls that would not change its
    /// reported state are dropped
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.driver.is_enabled() == enabled {
            return Ok(());
        }
        debug!(backend = %self.kind, enabled, "Changing backend state");
        self.driver.set_enabled(enabled)
    }

    pub fn set_hrtf_enabled(&mut self, enabled: bool) -> Result<()> {
        self.driver.set_hrtf_enabled(enabled)
    }

    pub fn set_hrtf_data_set(&mut self, name: &str) -> Result<()> {
        self.driver.set_hrtf_data_set(name)
    }

    pub fn set_logging_level(&mut self, level: i32) -> Result<()> {
        self.driver.set_logging_level(level)
    }

    pub fn hrtf_data_file_names(&self) -> Result<Vec<String>> {
        self.driver.hrtf_data_file_names()
    }

    /// Start sweeping the test sound around the listener.
    ///
    /// If a run is already active, `sink` immediately receives
    /// [`TestSoundError::InProgress`] and the active run carries on.
    pub fn play_test_sound(&mut self, mode: RotateMode, sink: TestSoundSink, now: Instant) {
        if self.state != TestSoundState::Idle {
            warn!(backend = %self.kind, "Test sound already playing");
            if sink.send(Err(TestSoundError::InProgress)).is_err() {
                trace!("Test sound receiver already dropped");
            }
            return;
        }
        debug!(backend = %self.kind, %mode, "Starting test sound");
        self.pending = Some(sink);
        let events = self.rotator.start(mode, now);
        self.dispatch(events);
    }

    /// Advance the active run to `now`
    pub fn poll_test_sound(&mut self, now: Instant) {
        let events = self.rotator.poll(now);
        self.dispatch(events);
    }

    /// When [`poll_test_sound`](Self::poll_test_sound) next has work to do
    pub fn test_sound_deadline(&self) -> Option<Instant> {
        self.rotator.deadline()
    }

    /// End the active run early; its result is still delivered
    pub fn stop_test_sound(&mut self) {
        let events = self.rotator.stop();
        self.dispatch(events);
    }

    fn dispatch(&mut self, events: Vec<RotatorEvent>) {
        let mut queue: VecDeque<RotatorEvent> = events.into();
        while let Some(event) = queue.pop_front() {
            match event {
                RotatorEvent::Started => self.on_started(&mut queue),
                RotatorEvent::PositionChanged(position) => self.on_position(position, &mut queue),
                RotatorEvent::Finished => self.on_finished(),
            }
        }
    }

    fn on_started(&mut self, queue: &mut VecDeque<RotatorEvent>) {
        self.state = TestSoundState::Started;
        if let Err(err) = self.driver.play_test_sound(&self.test_sound_path) {
            self.fail(err, queue);
        }
    }

    fn on_position(&mut self, position: Vector3, queue: &mut VecDeque<RotatorEvent>) {
        if self.state == TestSoundState::Idle {
            return;
        }
        self.state = TestSoundState::Positioning;
        if let Err(err) = self.driver.position_test_sound(position) {
            self.fail(err, queue);
        }
    }

    fn on_finished(&mut self) {
        self.state = TestSoundState::Idle;
        match self.driver.stop_test_sound() {
            Ok(()) => self.deliver(Ok(())),
            Err(err) if self.pending.is_some() => {
                error!(backend = %self.kind, error = %err, "Failed to stop test sound");
                self.deliver(Err(err.into()));
            }
            Err(err) => {
                warn!(backend = %self.kind, error = %err, "Failed to stop test sound after earlier failure");
            }
        }
    }

    fn fail(&mut self, err: DriverError, queue: &mut VecDeque<RotatorEvent>) {
        error!(backend = %self.kind, error = %err, "Test sound failed");
        self.deliver(Err(err.into()));
        self.state = TestSoundState::Idle;
        queue.extend(self.rotator.stop());
    }

    fn deliver(&mut self, result: TestSoundResult) {
        if let Some(sink) = self.pending.take() {
            debug!(backend = %self.kind, ok = result.is_ok(), "Test sound finished");
            if sink.send(result).is_err() {
                trace!("Test sound receiver already dropped");
            }
        }
    }
}

impl fmt::Debug for AudioAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioAdapter")
            .field("kind", &self.kind)
            .field("user_ids", &self.user_ids)
            .field("state", &self.state)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
