//! Integration tests for the orchestrator over headless drivers
//!
//! Every scenario goes through the public event vocabulary and checks the
//! resulting driver calls in the shared journal.

use earshot_app::bootstrap::{assemble_with_store, Host, HostOptions};
use earshot_core::domain::audio::BackendKind;
use earshot_core::domain::entities::UserId;
use earshot_core::domain::event::Event;
use earshot_core::domain::geometry::Vector3;
use earshot_core::domain::settings::{MemorySettingsStore, Settings};
use earshot_infra::audio::{DriverCall, DriverJournal, DriverOp, DriverRole};
use earshot_infra::settings::TomlSettingsFile;
use tempfile::TempDir;

fn host_with(settings: Settings) -> Host {
    assemble_with_store(
        &HostOptions::default(),
        Box::new(MemorySettingsStore::new(settings)),
    )
}

fn host() -> Host {
    host_with(Settings::default())
}

fn user(n: u16) -> UserId {
    UserId::new(n)
}

fn live_calls(journal: &DriverJournal, op: DriverOp) -> Vec<DriverCall> {
    journal
        .calls()
        .into_iter()
        .filter(|c| c.role == DriverRole::Live && c.op == op)
        .collect()
}

fn enabled_live_backends(host: &Host) -> Vec<BackendKind> {
    host.orchestrator
        .adapters()
        .live
        .iter()
        .filter(|(_, adapter)| adapter.is_enabled())
        .map(|(kind, _)| kind)
        .collect()
}

// ============================================================================
// PAIRING
// ============================================================================

#[test]
fn test_pairing_scenario() {
    let mut host = host();
    let o = &mut host.orchestrator;

    o.handle(Event::GameUserAdded { id: user(5) }).unwrap();
    assert!(live_calls(&host.journal, DriverOp::PositionUser).is_empty());

    o.handle(Event::ChatUserAdded { id: user(5) }).unwrap();
    let after_chat_add = live_calls(&host.journal, DriverOp::PositionUser);
    assert_eq!(after_chat_add.len(), BackendKind::ALL.len());
    assert!(after_chat_add.iter().all(|c| c.detail.starts_with("5 ")));

    o.handle(Event::UserMoved {
        id: user(5),
        position: Vector3::new(1.0, 0.0, 0.0),
    })
    .unwrap();
    host.journal.clear();

    o.handle(Event::ChatUserRemoved { id: user(5) }).unwrap();
    let removals = live_calls(&host.journal, DriverOp::RemoveUser);
    assert_eq!(removals.len(), BackendKind::ALL.len());
    for kind in BackendKind::ALL {
        assert_eq!(
            host.journal
                .count(kind, DriverRole::Live, DriverOp::RemoveUser),
            1
        );
    }
    assert!(live_calls(&host.journal, DriverOp::PositionUser).is_empty());

    let stored = o.users().get(user(5)).unwrap();
    assert!(stored.in_game);
    assert!(!stored.in_chat);
    assert_eq!(stored.position, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_moves_only_reach_backends_while_paired() {
    let mut host = host();
    let o = &mut host.orchestrator;

    o.handle(Event::ChatUserAdded { id: user(8) }).unwrap();
    o.handle(Event::UserMoved {
        id: user(8),
        position: Vector3::new(3.0, 0.0, 0.0),
    })
    .unwrap();
    assert!(live_calls(&host.journal, DriverOp::PositionUser).is_empty());

    o.handle(Event::GameUserAdded { id: user(8) }).unwrap();
    let placed = live_calls(&host.journal, DriverOp::PositionUser);
    assert_eq!(placed.len(), 2);
    assert!(placed.iter().all(|c| c.detail == "8 (3, 0, 0)"));

    // Nothing reaches the test drivers
    assert!(host
        .journal
        .calls()
        .iter()
        .all(|c| c.role == DriverRole::Live));
}

#[test]
fn test_removing_game_then_chat_forgets_user() {
    let mut host = host();
    let o = &mut host.orchestrator;

    o.add_game_user(user(2)).unwrap();
    o.add_chat_user(user(2)).unwrap();
    o.remove_game_user(user(2)).unwrap();
    o.remove_chat_user(user(2)).unwrap();

    assert_eq!(live_calls(&host.journal, DriverOp::RemoveUser).len(), 2);
    assert!(o.users().is_empty());
}

#[test]
fn test_events_for_local_user_are_ignored() {
    let mut host = host();
    let local = HostOptions::default().local_user;

    host.orchestrator
        .handle(Event::ChatUserAdded { id: local })
        .unwrap();
    host.orchestrator
        .handle(Event::GameUserAdded { id: local })
        .unwrap();

    assert!(host.journal.is_empty());
    assert!(!host.orchestrator.users().get(local).unwrap().in_game);
}

// ============================================================================
// CAMERA AND OUTPUT
// ============================================================================

#[test]
fn test_camera_looking_straight_up_is_skipped() {
    let mut host = host();
    for direction in [Vector3::new(0.0, 1.0, 0.0), Vector3::new(1e-30, 1.0, 0.0)] {
        host.orchestrator
            .handle(Event::CameraMoved {
                position: Vector3::new(10.0, 5.0, 3.0),
                direction,
            })
            .unwrap();
    }
    assert!(live_calls(&host.journal, DriverOp::PositionCamera).is_empty());

    host.orchestrator
        .handle(Event::CameraMoved {
            position: Vector3::ZERO,
            direction: Vector3::new(0.0, 0.0, -1.0),
        })
        .unwrap();
    let calls = live_calls(&host.journal, DriverOp::PositionCamera);
    assert_eq!(calls.len(), 2);
    assert!(calls
        .iter()
        .all(|c| c.detail.ends_with("up=(0, 1, 0)")));
}

#[test]
fn test_device_changes_reach_live_and_test_drivers() {
    let mut host = host();
    host.voice_chat.set_playback_device_name("Headset");
    host.orchestrator
        .handle(Event::PlaybackDeviceChanged)
        .unwrap();

    for kind in BackendKind::ALL {
        for role in [DriverRole::Live, DriverRole::Test] {
            let calls = host.journal.calls_for(kind, role);
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].op, DriverOp::SetPlaybackDeviceName);
            assert_eq!(calls[0].detail, "Headset");
        }
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

#[test]
fn test_backend_switch_moves_enabled_flag_once() {
    let mut host = host();
    host.orchestrator.initialize().unwrap();
    assert_eq!(enabled_live_backends(&host), vec![BackendKind::OpenAl]);
    host.journal.clear();

    host.orchestrator
        .handle(Event::SettingsSaved {
            settings: Settings {
                audio_backend: BackendKind::BuiltIn,
                ..Settings::default()
            },
        })
        .unwrap();

    let toggles: Vec<String> = live_calls(&host.journal, DriverOp::SetEnabled)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        toggles,
        vec![
            "live/open_al set_enabled false".to_string(),
            "live/built_in set_enabled true".to_string(),
        ]
    );
    assert_eq!(enabled_live_backends(&host), vec![BackendKind::BuiltIn]);
}

#[test]
fn test_at_most_one_backend_enabled_across_saves() {
    let mut host = host();
    host.orchestrator.initialize().unwrap();

    let sequence = [
        (true, BackendKind::BuiltIn),
        (true, BackendKind::BuiltIn),
        (false, BackendKind::OpenAl),
        (true, BackendKind::OpenAl),
        (false, BackendKind::BuiltIn),
        (true, BackendKind::BuiltIn),
    ];
    for (positioning_enabled, audio_backend) in sequence {
        host.orchestrator
            .save_settings(Settings {
                positioning_enabled,
                audio_backend,
                ..Settings::default()
            })
            .unwrap();

        let enabled = enabled_live_backends(&host);
        if positioning_enabled {
            assert_eq!(enabled, vec![audio_backend]);
        } else {
            assert!(enabled.is_empty());
        }
    }
}

#[test]
fn test_saved_settings_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    let saved = Settings {
        hrtf_enabled: true,
        audio_backend: BackendKind::BuiltIn,
        ..Settings::default()
    };

    let mut first = assemble_with_store(
        &HostOptions::default(),
        Box::new(TomlSettingsFile::new(&path)),
    );
    first.orchestrator.save_settings(saved.clone()).unwrap();

    let mut second = assemble_with_store(
        &HostOptions::default(),
        Box::new(TomlSettingsFile::new(&path)),
    );
    assert_eq!(second.orchestrator.settings(), &saved);

    second.orchestrator.initialize().unwrap();
    assert_eq!(enabled_live_backends(&second), vec![BackendKind::BuiltIn]);
    assert_eq!(
        second
            .journal
            .count(BackendKind::OpenAl, DriverRole::Live, DriverOp::SetHrtfEnabled),
        1
    );
}

#[test]
fn test_live_driver_failure_surfaces_to_caller() {
    let mut host = host();
    host.journal
        .fail_on(BackendKind::OpenAl, DriverRole::Live, DriverOp::PositionUser);

    host.orchestrator.add_game_user(user(3)).unwrap();
    let err = host.orchestrator.add_chat_user(user(3)).unwrap_err();
    assert_eq!(err.operation, "position_user");

    // The roster is still updated
    assert!(host.orchestrator.users().get(user(3)).unwrap().paired());
}
