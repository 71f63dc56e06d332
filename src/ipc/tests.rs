use super::protocol::*;
use super::router::*;
use super::session::*;
use crate::catalog::RecipeCatalog;
use crate::recipe::{Instruction, RecipeScript};
use crate::session::VoiceSession;
use crate::speech::Notice;
use crossbeam_channel::bounded;
use std::path::Path;
use std::thread;
use std::time::Duration;

fn test_session(timer: &str) -> IpcVoiceSession {
    init_event_sink();
    let script = RecipeScript::new(
        "dal",
        "Tadka Dal",
        vec![
            Instruction::Plain("Rinse the lentils".to_string()),
            Instruction::Timed {
                text: "Simmer the lentils".to_string(),
                timer: Some(timer.to_string()),
            },
        ],
    )
    .expect("script");
    VoiceSession::new(script, IpcSpeaker, IpcSpeechInput::new("en-US"))
}

fn speak(text: &str) -> IpcEvent {
    IpcEvent::Speak {
        text: text.to_string(),
    }
}

// ============================================================================
// Protocol Shape
// ============================================================================

#[test]
fn events_serialize_with_event_tag() {
    let json = serde_json::to_value(IpcEvent::Timer {
        remaining: 90,
        clock: "01:30".to_string(),
        running: true,
    })
    .expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({"event": "timer", "remaining": 90, "clock": "01:30", "running": true})
    );
    let json = serde_json::to_value(IpcEvent::Alert).expect("serialize");
    assert_eq!(json, serde_json::json!({"event": "alert"}));
}

#[test]
fn commands_parse_with_defaults() {
    let cmd: IpcCommand =
        serde_json::from_str(r#"{"cmd": "recognition_result", "text": "next"}"#).expect("parse");
    assert_eq!(
        cmd,
        IpcCommand::RecognitionResult {
            text: "next".to_string(),
            is_final: true,
            handle: None,
        }
    );
    let cmd: IpcCommand =
        serde_json::from_str(r#"{"cmd": "recognition_end", "handle": 3}"#).expect("parse");
    assert_eq!(cmd, IpcCommand::RecognitionEnd { handle: Some(3) });
    assert!(serde_json::from_str::<IpcCommand>(r#"{"cmd": "dance"}"#).is_err());
}

// ============================================================================
// Command Routing
// ============================================================================

#[test]
fn say_next_speaks_and_reports_step() {
    let mut session = test_session("10 min");
    take_events();

    assert_eq!(
        handle_command(
            &mut session,
            IpcCommand::Say {
                text: "next step please".to_string()
            }
        ),
        LoopControl::Continue
    );
    assert_eq!(
        take_events(),
        vec![
            speak("Simmer the lentils"),
            IpcEvent::Step {
                index: 1,
                total: 2,
                label: "Step 2 of 2".to_string(),
                text: "Simmer the lentils".to_string(),
            },
        ]
    );
}

#[test]
fn boundary_emits_no_step_event() {
    let mut session = test_session("10 min");
    take_events();
    handle_command(&mut session, IpcCommand::Previous);
    assert_eq!(take_events(), vec![speak(Notice::FirstStep.text())]);
}

#[test]
fn start_timer_reports_countdown_and_tick_updates_clock() {
    let mut session = test_session("2 min");
    handle_command(&mut session, IpcCommand::Next);
    take_events();

    handle_command(&mut session, IpcCommand::StartTimer);
    assert_eq!(
        take_events(),
        vec![
            speak(Notice::TimerStarting.text()),
            IpcEvent::Timer {
                remaining: 120,
                clock: "02:00".to_string(),
                running: true,
            },
        ]
    );

    handle_tick(&mut session);
    assert_eq!(
        take_events(),
        vec![IpcEvent::Timer {
            remaining: 119,
            clock: "01:59".to_string(),
            running: true,
        }]
    );

    handle_command(&mut session, IpcCommand::StartTimer);
    assert!(take_events().is_empty());
}

#[test]
fn listening_round_trip_uses_handles() {
    let mut session = test_session("10 min");
    take_events();

    handle_command(&mut session, IpcCommand::StartListening);
    assert_eq!(
        take_events(),
        vec![
            IpcEvent::RecognitionStart {
                handle: 1,
                lang: "en-US".to_string(),
            },
            IpcEvent::Listening { active: true },
        ]
    );

    handle_command(
        &mut session,
        IpcCommand::RecognitionResult {
            text: "next".to_string(),
            is_final: true,
            handle: Some(1),
        },
    );
    assert_eq!(session.navigator().current_index(), 1);
    take_events();

    handle_command(&mut session, IpcCommand::RecognitionEnd { handle: None });
    assert_eq!(
        take_events(),
        vec![IpcEvent::RecognitionStart {
            handle: 2,
            lang: "en-US".to_string(),
        }]
    );

    handle_command(&mut session, IpcCommand::StopListening);
    assert_eq!(
        take_events(),
        vec![
            IpcEvent::RecognitionStop { handle: 2 },
            speak(Notice::StoppedListening.text()),
            IpcEvent::Listening { active: false },
        ]
    );

    // The end event for the stream we just closed must not reopen it.
    handle_command(&mut session, IpcCommand::RecognitionEnd { handle: Some(2) });
    assert!(take_events().is_empty());
    assert!(!session.listening().is_listening());
}

#[test]
fn recognition_without_open_stream_is_ignored() {
    let mut session = test_session("10 min");
    take_events();
    handle_command(
        &mut session,
        IpcCommand::RecognitionResult {
            text: "next".to_string(),
            is_final: true,
            handle: None,
        },
    );
    assert!(take_events().is_empty());
    assert_eq!(session.navigator().current_index(), 0);
}

#[test]
fn status_reports_full_state() {
    let mut session = test_session("10 min");
    take_events();
    handle_command(&mut session, IpcCommand::Status);
    assert_eq!(
        take_events(),
        vec![IpcEvent::Status {
            recipe_id: "dal".to_string(),
            title: "Tadka Dal".to_string(),
            index: 0,
            total: 2,
            label: "Step 1 of 2".to_string(),
            text: "Rinse the lentils".to_string(),
            remaining: 0,
            clock: "00:00".to_string(),
            timer_running: false,
            listening: false,
        }]
    );
}

#[test]
fn session_start_announces_recipe() {
    let session = test_session("10 min");
    take_events();
    emit_session_started(&session, "en-US");
    let events = take_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        IpcEvent::Session { recipe_id, steps: 2, .. } if recipe_id == "dal"
    ));
    assert!(matches!(&events[1], IpcEvent::Step { index: 0, .. }));
}

// ============================================================================
// Main Loop
// ============================================================================

#[test]
fn loop_exits_on_quit_and_on_closed_input() {
    let mut session = test_session("10 min");
    let (tx, rx) = bounded(8);
    tx.send(IpcCommand::Next).expect("send");
    tx.send(IpcCommand::Quit).expect("send");
    tx.send(IpcCommand::Previous).expect("send");
    assert_eq!(run_ipc_loop(&mut session, &rx, Duration::from_millis(5)), "quit");
    assert_eq!(session.navigator().current_index(), 1);

    drop(tx);
    let _ = rx.try_recv();
    assert_eq!(
        run_ipc_loop(&mut session, &rx, Duration::from_millis(5)),
        "input_closed"
    );
}

#[test]
fn loop_ticks_only_while_timer_runs() {
    let mut session = test_session("1 min");
    let (tx, rx) = bounded(8);
    tx.send(IpcCommand::Next).expect("send");
    tx.send(IpcCommand::StartTimer).expect("send");
    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        let _ = tx.send(IpcCommand::Quit);
    });
    take_events();
    assert_eq!(run_ipc_loop(&mut session, &rx, Duration::from_millis(1)), "quit");
    sender.join().expect("sender thread");

    assert!(session.timer().remaining_seconds() < 60);
    let ticks = take_events()
        .into_iter()
        .filter(|event| matches!(event, IpcEvent::Timer { running: true, .. }))
        .count();
    assert!(ticks >= 2);
}

#[test]
fn paused_timer_stops_ticking() {
    let mut session = test_session("1 min");
    handle_command(&mut session, IpcCommand::Next);
    handle_command(&mut session, IpcCommand::StartTimer);
    handle_command(&mut session, IpcCommand::PauseTimer);
    assert!(!session.needs_tick());
    let remaining = session.timer().remaining_seconds();

    let (tx, rx) = bounded(8);
    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        let _ = tx.send(IpcCommand::Quit);
    });
    run_ipc_loop(&mut session, &rx, Duration::from_millis(1));
    sender.join().expect("sender thread");
    assert_eq!(session.timer().remaining_seconds(), remaining);
}

#[test]
fn missing_recipe_reports_fatal_error() {
    init_event_sink();
    take_events();
    let catalog = RecipeCatalog::from_json_str("[]", Path::new("inline.json")).expect("catalog");
    let config = {
        use clap::Parser;
        crate::config::AppConfig::parse_from(["voxchef"])
    };
    assert!(run_ipc_mode(&config, &catalog, "ghost").is_err());
    let events = take_events();
    assert_eq!(events[0], speak(Notice::RecipeNotFound.text()));
    assert!(matches!(
        &events[1],
        IpcEvent::Error { recoverable: false, .. }
    ));
    assert_eq!(
        events[2],
        IpcEvent::SessionEnd {
            reason: "load_failed".to_string()
        }
    );
}
