//! Earshot core: positional voice-chat orchestration
//!
//! Binds a voice-chat roster and a game-world simulation so that every user
//! present in both is rendered at their in-game location relative to the
//! camera. Audio rendering itself is delegated to [`domain::audio::AudioDriver`]
//! implementations living in the `infra` crate.

pub mod domain;
