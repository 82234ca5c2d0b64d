//! Timed generator of test-sound positions
//!
//! The rotator sweeps a point around the listener (at the origin, facing -Z)
//! along the path selected by a [`RotateMode`]. It owns no timer: the host
//! polls it with the current instant and sleeps until [`PositionRotator::deadline`].

use crate::domain::geometry::Vector3;
use crate::domain::settings::RotateMode;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Distance between the listener and the test sound
pub const TEST_SOUND_DISTANCE: f32 = 2.0;

/// Observable rotator events, emitted in this order for every run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotatorEvent {
    Started,
    PositionChanged(Vector3),
    Finished,
}

/// One revolution around the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPath {
    steps: u32,
    interval: Duration,
}

impl RotationPath {
    pub fn for_mode(mode: RotateMode) -> Self {
        match mode {
            RotateMode::Stepped => Self {
                steps: 8,
                interval: Duration::from_millis(1000),
            },
            RotateMode::Smooth => Self {
                steps: 120,
                interval: Duration::from_millis(50),
            },
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Point `index` of the path; angles grow clockwise starting in front
    pub fn point(&self, index: u32) -> Vector3 {
        let angle = std::f32::consts::TAU * index as f32 / self.steps as f32;
        Vector3::new(
            TEST_SOUND_DISTANCE * angle.sin(),
            0.0,
            -TEST_SOUND_DISTANCE * angle.cos(),
        )
    }

    /// Time from start until point `index` is due; `steps` is the finish
    fn offset(&self, index: u32) -> Duration {
        self.interval * index
    }
}

#[derive(Debug, Clone)]
struct Run {
    path: RotationPath,
    started_at: Instant,
    next_index: u32,
}

impl Run {
    fn next_due(&self) -> Instant {
        self.started_at + self.path.offset(self.next_index)
    }
}

/// Restartable generator of [`RotatorEvent`]s
#[derive(Debug, Default)]
pub struct PositionRotator {
    run: Option<Run>,
}

impl PositionRotator {
    pub fn new() -> Self {
        Self { run: None }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Begin a run of `mode`. The first point becomes due at `now`.
    ///
    /// Restarting while a run is active finishes the old run first.
    pub fn start(&mut self, mode: RotateMode, now: Instant) -> Vec<RotatorEvent> {
        let mut events = self.stop();
        let path = RotationPath::for_mode(mode);
        debug!(%mode, steps = path.steps, "Rotator started");
        self.run = Some(Run {
            path,
            started_at: now,
            next_index: 0,
        });
        events.push(RotatorEvent::Started);
        events
    }

    /// Emit every event that is due at `now`, in path order
    pub fn poll(&mut self, now: Instant) -> Vec<RotatorEvent> {
        let mut events = Vec::new();
        while let Some(run) = self.run.as_mut() {
            if now < run.next_due() {
                break;
            }
            if run.next_index < run.path.steps {
                let position = run.path.point(run.next_index);
                trace!(index = run.next_index, %position, "Rotator advanced");
                run.next_index += 1;
                events.push(RotatorEvent::PositionChanged(position));
            } else {
                debug!("Rotator completed its path");
                self.run = None;
                events.push(RotatorEvent::Finished);
            }
        }
        events
    }

    /// When the next event becomes due, if a run is active
    pub fn deadline(&self) -> Option<Instant> {
        self.run.as_ref().map(Run::next_due)
    }

    /// End the current run. Safe in any state; emits `Finished` only if a
    /// run was active.
    pub fn stop(&mut self) -> Vec<RotatorEvent> {
        match self.run.take() {
            Some(_) => {
                debug!("Rotator stopped");
                vec![RotatorEvent::Finished]
            }
            None => Vec::new(),
        }
    }
}
