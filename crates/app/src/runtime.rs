//! Event loop owning the orchestrator
//!
//! The loop is the only code touching the [`Orchestrator`]. It waits on the
//! message channel and on the next test-sound deadline, whichever comes
//! first, and shuts the backends down once every sender is gone.

use earshot_core::domain::audio::adapter::TestSoundResult;
use earshot_core::domain::event::Event;
use earshot_core::domain::orchestrator::Orchestrator;
use earshot_core::domain::settings::Settings;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace};

/// Requests accepted by [`run`]
#[derive(Debug)]
pub enum HostMessage {
    Event(Event),
    /// Sweep the test sound with unsaved settings; `reply` gets the outcome
    PlayTestSound {
        settings: Settings,
        reply: oneshot::Sender<TestSoundResult>,
    },
    StopTestSound,
}

/// Drive `orchestrator` until `messages` is closed, then shut it down and
/// hand it back.
pub async fn run(
    mut orchestrator: Orchestrator,
    mut messages: mpsc::Receiver<HostMessage>,
) -> Orchestrator {
    if let Err(e) = orchestrator.initialize() {
        error!(error = %e, "Failed to initialize audio backends");
    }
    info!("Event loop started");

    loop {
        let deadline = orchestrator.next_test_sound_deadline();
        tokio::select! {
            message = messages.recv() => match message {
                Some(message) => handle_message(&mut orchestrator, message),
                None => break,
            },
            _ = sleep_until(deadline) => {
                orchestrator.poll_test_sounds(now());
            }
        }
    }

    if let Err(e) = orchestrator.shutdown() {
        error!(error = %e, "Failed to shut down audio backends");
    }
    info!("Event loop stopped");
    orchestrator
}

fn handle_message(orchestrator: &mut Orchestrator, message: HostMessage) {
    match message {
        HostMessage::Event(event) => {
            trace!(?event, "Handling event");
            if let Err(e) = orchestrator.handle(event) {
                error!(error = %e, "Failed to apply event");
            }
        }
        HostMessage::PlayTestSound { settings, reply } => {
            let result = orchestrator.play_test_audio_with_settings(&settings, now());
            tokio::spawn(async move {
                match result.await {
                    Ok(outcome) => {
                        if reply.send(outcome).is_err() {
                            debug!("Test sound requester went away");
                        }
                    }
                    Err(_) => debug!("Test sound result dropped"),
                }
            });
        }
        HostMessage::StopTestSound => orchestrator.stop_test_audio(),
    }
}

/// Current time on the runtime clock, so paused test runtimes stay consistent
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
