//! Audio driver that tracks backend state without producing sound

use earshot_core::domain::audio::{AudioDriver, BackendKind, DriverError, Result};
use earshot_core::domain::entities::UserId;
use earshot_core::domain::geometry::Vector3;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Directory under the data directory holding HRTF tables
pub const HRTF_DIR: &str = "hrtf";

/// Extension of HRTF table files
pub const HRTF_EXTENSION: &str = "mhr";

/// Calls kept by [`DriverJournal::new`]; older calls are discarded
pub const DEFAULT_JOURNAL_CAPACITY: usize = 4096;

/// Whether a driver renders the roster or only the test sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverRole {
    Live,
    Test,
}

impl fmt::Display for DriverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverRole::Live => write!(f, "live"),
            DriverRole::Test => write!(f, "test"),
        }
    }
}

/// Every operation of the [`AudioDriver`] port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverOp {
    PositionUser,
    RemoveUser,
    PositionCamera,
    PlayTestSound,
    PositionTestSound,
    StopTestSound,
    SetPlaybackDeviceName,
    SetPlaybackVolume,
    SetEnabled,
    SetHrtfEnabled,
    SetHrtfDataSet,
    HrtfDataFileNames,
    SetLoggingLevel,
}

impl DriverOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverOp::PositionUser => "position_user",
            DriverOp::RemoveUser => "remove_user",
            DriverOp::PositionCamera => "position_camera",
            DriverOp::PlayTestSound => "play_test_sound",
            DriverOp::PositionTestSound => "position_test_sound",
            DriverOp::StopTestSound => "stop_test_sound",
            DriverOp::SetPlaybackDeviceName => "set_playback_device_name",
            DriverOp::SetPlaybackVolume => "set_playback_volume",
            DriverOp::SetEnabled => "set_enabled",
            DriverOp::SetHrtfEnabled => "set_hrtf_enabled",
            DriverOp::SetHrtfDataSet => "set_hrtf_data_set",
            DriverOp::HrtfDataFileNames => "hrtf_data_file_names",
            DriverOp::SetLoggingLevel => "set_logging_level",
        }
    }
}

impl fmt::Display for DriverOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One journaled driver call
#[derive(Debug, Clone, PartialEq)]
pub struct DriverCall {
    pub backend: BackendKind,
    pub role: DriverRole,
    pub op: DriverOp,
    /// Human-readable arguments, empty for argument-less calls
    pub detail: String,
}

impl fmt::Display for DriverCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.role, self.backend, self.op)?;
        if !self.detail.is_empty() {
            write!(f, " {}", self.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct JournalState {
    calls: VecDeque<DriverCall>,
    capacity: usize,
    discarded: u64,
    failures: HashSet<(BackendKind, DriverRole, DriverOp)>,
}

impl Default for JournalState {
    fn default() -> Self {
        Self {
            calls: VecDeque::new(),
            capacity: DEFAULT_JOURNAL_CAPACITY,
            discarded: 0,
            failures: HashSet::new(),
        }
    }
}

/// Shared log of the most recent calls made to every [`HeadlessDriver`]
/// built on it.
///
/// Also carries the failure switches, so failures can be injected after the
/// drivers have been handed to their adapters.
#[derive(Debug, Clone, Default)]
pub struct DriverJournal(Rc<RefCell<JournalState>>);

impl DriverJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal keeping at most `capacity` calls
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Rc::new(RefCell::new(JournalState {
            capacity,
            ..JournalState::default()
        })))
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.0.borrow().calls.iter().cloned().collect()
    }

    /// Calls made to one driver, in order
    pub fn calls_for(&self, backend: BackendKind, role: DriverRole) -> Vec<DriverCall> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|c| c.backend == backend && c.role == role)
            .cloned()
            .collect()
    }

    pub fn count(&self, backend: BackendKind, role: DriverRole, op: DriverOp) -> usize {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|c| c.backend == backend && c.role == role && c.op == op)
            .count()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().calls.is_empty()
    }

    /// Calls dropped to stay within capacity
    pub fn discarded(&self) -> u64 {
        self.0.borrow().discarded
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Make every later `op` on the given driver fail
    pub fn fail_on(&self, backend: BackendKind, role: DriverRole, op: DriverOp) {
        self.0.borrow_mut().failures.insert((backend, role, op));
    }

    pub fn clear_failures(&self) {
        self.0.borrow_mut().failures.clear();
    }

    fn record(&self, call: DriverCall) -> bool {
        let mut state = self.0.borrow_mut();
        let fails = state
            .failures
            .contains(&(call.backend, call.role, call.op));
        if state.capacity == 0 {
            state.discarded += 1;
            return fails;
        }
        while state.calls.len() >= state.capacity {
            state.calls.pop_front();
            state.discarded += 1;
        }
        state.calls.push_back(call);
        fails
    }
}

/// Listener placement as last given to the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listener {
    pub position: Vector3,
    pub forward: Vector3,
    pub up: Vector3,
}

/// [`AudioDriver`] that renders nothing.
///
/// The test sound asset must exist on disk and HRTF data names are read from
/// `<data_dir>/hrtf/*.mhr`, so misconfigured data directories fail the same
/// way they would with a rendering backend.
pub struct HeadlessDriver {
    backend: BackendKind,
    role: DriverRole,
    data_dir: PathBuf,
    journal: DriverJournal,
    enabled: bool,
    device_name: String,
    volume: f32,
    hrtf_enabled: bool,
    hrtf_data_set: String,
    logging_level: i32,
    sources: BTreeMap<UserId, Vector3>,
    listener: Option<Listener>,
    test_sound: Option<Vector3>,
}

impl HeadlessDriver {
    pub fn new(
        backend: BackendKind,
        role: DriverRole,
        data_dir: impl AsRef<Path>,
        journal: DriverJournal,
    ) -> Self {
        Self {
            backend,
            role,
            data_dir: data_dir.as_ref().to_path_buf(),
            journal,
            enabled: false,
            device_name: String::new(),
            volume: 1.0,
            hrtf_enabled: false,
            hrtf_data_set: String::new(),
            logging_level: 0,
            sources: BTreeMap::new(),
            listener: None,
            test_sound: None,
        }
    }

    /// Make every later `op` on this driver fail
    pub fn fail_on(&self, op: DriverOp) {
        self.journal.fail_on(self.backend, self.role, op);
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn hrtf_enabled(&self) -> bool {
        self.hrtf_enabled
    }

    pub fn hrtf_data_set(&self) -> &str {
        &self.hrtf_data_set
    }

    pub fn source(&self, id: UserId) -> Option<Vector3> {
        self.sources.get(&id).copied()
    }

    pub fn listener(&self) -> Option<Listener> {
        self.listener
    }

    /// Position of the test sound while it is playing
    pub fn test_sound(&self) -> Option<Vector3> {
        self.test_sound
    }

    fn call(&self, op: DriverOp, detail: String) -> Result<()> {
        match self.logging_level {
            i32::MIN..=0 => trace!(backend = %self.backend, role = %self.role, %op, %detail, "Driver call"),
            1 => info!(backend = %self.backend, role = %self.role, %op, %detail, "Driver call"),
            _ => debug!(backend = %self.backend, role = %self.role, %op, %detail, "Driver call"),
        }
        let fails = self.journal.record(DriverCall {
            backend: self.backend,
            role: self.role,
            op,
            detail,
        });
        if fails {
            return Err(DriverError::new(op.as_str(), "injected failure"));
        }
        Ok(())
    }
}

impl fmt::Debug for HeadlessDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessDriver")
            .field("backend", &self.backend)
            .field("role", &self.role)
            .field("enabled", &self.enabled)
            .field("sources", &self.sources.len())
            .field("test_sound", &self.test_sound)
            .finish_non_exhaustive()
    }
}

impl AudioDriver for HeadlessDriver {
    fn position_user(&mut self, id: UserId, position: Vector3) -> Result<()> {
        self.call(DriverOp::PositionUser, format!("{id} {position}"))?;
        self.sources.insert(id, position);
        Ok(())
    }

    fn remove_user(&mut self, id: UserId) -> Result<()> {
        self.call(DriverOp::RemoveUser, id.to_string())?;
        self.sources.remove(&id);
        Ok(())
    }

    fn position_camera(&mut self, position: Vector3, forward: Vector3, up: Vector3) -> Result<()> {
        self.call(
            DriverOp::PositionCamera,
            format!("{position} forward={forward} up={up}"),
        )?;
        self.listener = Some(Listener {
            position,
            forward,
            up,
        });
        Ok(())
    }

    fn play_test_sound(&mut self, asset: &Path) -> Result<()> {
        self.call(DriverOp::PlayTestSound, asset.display().to_string())?;
        if !asset.is_file() {
            return Err(DriverError::new(
                DriverOp::PlayTestSound.as_str(),
                format!("test sound asset not found: {}", asset.display()),
            ));
        }
        self.test_sound = Some(Vector3::ZERO);
        Ok(())
    }

    fn position_test_sound(&mut self, position: Vector3) -> Result<()> {
        self.call(DriverOp::PositionTestSound, position.to_string())?;
        match self.test_sound.as_mut() {
            Some(current) => {
                *current = position;
                Ok(())
            }
            None => Err(DriverError::new(
                DriverOp::PositionTestSound.as_str(),
                "test sound is not playing",
            )),
        }
    }

    fn stop_test_sound(&mut self) -> Result<()> {
        self.call(DriverOp::StopTestSound, String::new())?;
        self.test_sound = None;
        Ok(())
    }

    fn set_playback_device_name(&mut self, name: &str) -> Result<()> {
        self.call(DriverOp::SetPlaybackDeviceName, name.to_string())?;
        self.device_name = name.to_string();
        Ok(())
    }

    fn set_playback_volume(&mut self, volume: f32) -> Result<()> {
        self.call(DriverOp::SetPlaybackVolume, volume.to_string())?;
        self.volume = volume;
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.call(DriverOp::SetEnabled, enabled.to_string())?;
        self.enabled = enabled;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_hrtf_enabled(&mut self, enabled: bool) -> Result<()> {
        self.call(DriverOp::SetHrtfEnabled, enabled.to_string())?;
        self.hrtf_enabled = enabled;
        Ok(())
    }

    fn set_hrtf_data_set(&mut self, name: &str) -> Result<()> {
        self.call(DriverOp::SetHrtfDataSet, name.to_string())?;
        self.hrtf_data_set = name.to_string();
        Ok(())
    }

    fn hrtf_data_file_names(&self) -> Result<Vec<String>> {
        self.call(DriverOp::HrtfDataFileNames, String::new())?;
        let dir = self.data_dir.join(HRTF_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            DriverError::new(
                DriverOp::HrtfDataFileNames.as_str(),
                format!("{}: {}", dir.display(), e),
            )
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(HRTF_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn set_logging_level(&mut self, level: i32) -> Result<()> {
        self.call(DriverOp::SetLoggingLevel, level.to_string())?;
        self.logging_level = level;
        Ok(())
    }
}
