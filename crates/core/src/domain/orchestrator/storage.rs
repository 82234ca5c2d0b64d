//! Entity storages owned by the orchestrator

use crate::domain::entities::{User, UserId};
use crate::domain::settings::{Settings, SettingsStore};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, trace};

/// Known users, keyed by id
#[derive(Debug, Clone, Default)]
pub struct UserStorage {
    users: BTreeMap<UserId, User>,
}

impl UserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub fn set(&mut self, user: User) {
        trace!(user = %user.id, in_game = user.in_game, in_chat = user.in_chat, "Storing user");
        self.users.insert(user.id, user);
    }

    pub fn remove(&mut self, id: UserId) {
        trace!(user = %id, "Forgetting user");
        self.users.remove(&id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Current settings backed by a persistence collaborator.
///
/// Persistence failures are logged and never reach the caller; the
/// in-memory copy always reflects the last saved value.
pub struct SettingsStorage {
    current: Settings,
    store: Box<dyn SettingsStore>,
}

impl SettingsStorage {
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        let current = store.load();
        Self { current, store }
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    pub fn set(&mut self, settings: Settings) {
        if let Err(e) = self.store.save(&settings) {
            error!(error = %e, "Failed to persist settings");
        }
        self.current = settings;
    }
}

impl fmt::Debug for SettingsStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStorage")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
