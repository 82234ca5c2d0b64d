//! Voice-chat client stand-in

use earshot_core::domain::collaborators::VoiceChat;
use earshot_core::domain::entities::UserId;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_DEVICE_NAME: &str = "default";

#[derive(Debug, Clone)]
struct ClientState {
    my_user_id: UserId,
    device_name: String,
    volume: f32,
}

/// Voice-chat source whose output settings are changed by the host.
///
/// Clones share state: keep one clone, hand another to the registry, and
/// raise the matching event after changing a value.
#[derive(Debug, Clone)]
pub struct StaticVoiceChat(Rc<RefCell<ClientState>>);

impl StaticVoiceChat {
    pub fn new(my_user_id: UserId) -> Self {
        Self(Rc::new(RefCell::new(ClientState {
            my_user_id,
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            volume: 1.0,
        })))
    }

    pub fn set_playback_device_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().device_name = name.into();
    }

    pub fn set_playback_volume(&self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }
}

impl VoiceChat for StaticVoiceChat {
    fn my_user_id(&self) -> UserId {
        self.0.borrow().my_user_id
    }

    fn playback_device_name(&self) -> String {
        self.0.borrow().device_name.clone()
    }

    fn playback_volume(&self) -> f32 {
        self.0.borrow().volume
    }
}
