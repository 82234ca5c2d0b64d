//! Users and the camera, the state mirrored from the game and the chat roster

use crate::domain::geometry::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle shared by the game and the voice-chat systems for the same person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u16);

impl UserId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for UserId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person seen in the game, in the chat, or in both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Only meaningful while `in_game` is set
    pub position: Vector3,
    pub in_game: bool,
    pub in_chat: bool,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            position: Vector3::ZERO,
            in_game: false,
            in_chat: false,
        }
    }

    /// Present in both systems, the only state in which audio backends see the user
    pub fn paired(&self) -> bool {
        self.in_game && self.in_chat
    }

    /// Present in at least one system; the record is discarded once this is false
    pub fn exists(&self) -> bool {
        self.in_game || self.in_chat
    }
}

/// The listener
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vector3,
    /// Forward vector
    pub direction: Vector3,
}

impl Camera {
    pub fn new(position: Vector3, direction: Vector3) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Up vector derived from the forward vector.
    ///
    /// Returns `None` when the forward vector points straight up or down
    /// (`x == 0 && z == 0`), or is so close to vertical that the cross
    /// product has no usable length.
    pub fn up(&self) -> Option<Vector3> {
        let forward = self.direction;
        if forward.x == 0.0 && forward.z == 0.0 {
            return None;
        }
        let side = Vector3::new(forward.z, 0.0, -forward.x);
        let up = forward.cross(&side);
        let length = up.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(up * (1.0 / length))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0))
    }
}
