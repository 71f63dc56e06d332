use crate::config::AppConfig;
use crate::recipe::RecipeStore;
use crate::session::VoiceSession;
use crate::speech::{RecognitionHandle, SpeechInput, SpeechOutput};
use crate::log_debug;
use anyhow::{Context, Result};
use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use super::protocol::{IpcCommand, IpcEvent};
use super::router::{handle_command, handle_tick, LoopControl};

pub(super) type IpcVoiceSession = VoiceSession<IpcSpeaker, IpcSpeechInput>;

// ============================================================================
// Event Sending
// ============================================================================

pub(super) fn send_event(event: &IpcEvent) {
    #[cfg(any(test, feature = "mutants"))]
    if capture_test_event(event) {
        return;
    }
    if let Ok(json) = serde_json::to_string(event) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{json}");
        let _ = stdout.flush();
    }
}

#[cfg(any(test, feature = "mutants"))]
thread_local! {
    static EVENT_SINK: std::cell::RefCell<Option<Vec<IpcEvent>>> =
        const { std::cell::RefCell::new(None) };
}

#[cfg(any(test, feature = "mutants"))]
fn capture_test_event(event: &IpcEvent) -> bool {
    EVENT_SINK.with(|sink| match sink.borrow_mut().as_mut() {
        Some(events) => {
            events.push(event.clone());
            true
        }
        None => false,
    })
}

/// Start capturing events emitted on this thread instead of writing them to stdout.
#[cfg(any(test, feature = "mutants"))]
#[allow(dead_code)]
pub(super) fn init_event_sink() {
    EVENT_SINK.with(|sink| {
        let mut sink = sink.borrow_mut();
        if sink.is_none() {
            *sink = Some(Vec::new());
        }
    });
}

/// Drain everything captured on this thread so far.
#[cfg(any(test, feature = "mutants"))]
#[allow(dead_code)]
pub(super) fn take_events() -> Vec<IpcEvent> {
    EVENT_SINK.with(|sink| {
        sink.borrow_mut()
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    })
}

// ============================================================================
// Speech Adapters
// ============================================================================

/// Forwards speech to the host as `speak` / `alert` events.
#[derive(Debug, Default)]
pub struct IpcSpeaker;

impl SpeechOutput for IpcSpeaker {
    fn speak(&mut self, text: &str) {
        send_event(&IpcEvent::Speak {
            text: text.to_string(),
        });
    }

    fn alert(&mut self) {
        send_event(&IpcEvent::Alert);
    }
}

/// Asks the host to open and close recognition streams.
#[derive(Debug)]
pub struct IpcSpeechInput {
    lang: String,
    next_handle: u64,
}

impl IpcSpeechInput {
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            next_handle: 0,
        }
    }
}

impl SpeechInput for IpcSpeechInput {
    fn start_continuous(&mut self) -> Result<RecognitionHandle> {
        self.next_handle += 1;
        let handle = RecognitionHandle::from_raw(self.next_handle);
        send_event(&IpcEvent::RecognitionStart {
            handle: handle.id(),
            lang: self.lang.clone(),
        });
        Ok(handle)
    }

    fn stop(&mut self, handle: RecognitionHandle) {
        send_event(&IpcEvent::RecognitionStop {
            handle: handle.id(),
        });
    }
}

// ============================================================================
// Stdin Reader Thread
// ============================================================================

fn spawn_stdin_reader(tx: Sender<IpcCommand>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<IpcCommand>(trimmed) {
                Ok(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    send_event(&IpcEvent::Error {
                        message: format!("Invalid command: {e}"),
                        recoverable: true,
                    });
                }
            }
        }
        log_debug("stdin reader thread exiting");
    })
}

// ============================================================================
// Main Loop
// ============================================================================

/// Load `recipe_id` and drive its voice session over stdin/stdout until the
/// host quits or closes stdin.
pub fn run_ipc_mode(config: &AppConfig, store: &dyn RecipeStore, recipe_id: &str) -> Result<()> {
    log_debug(&format!("starting IPC session for recipe {recipe_id}"));
    let mut session = match VoiceSession::load(
        store,
        recipe_id,
        IpcSpeaker,
        IpcSpeechInput::new(&config.lang),
    ) {
        Ok(session) => session,
        Err(err) => {
            send_event(&IpcEvent::Error {
                message: err.to_string(),
                recoverable: false,
            });
            send_event(&IpcEvent::SessionEnd {
                reason: "load_failed".to_string(),
            });
            return Err(err).with_context(|| format!("cannot start session for {recipe_id}"));
        }
    };

    emit_session_started(&session, &config.lang);

    let (cmd_tx, cmd_rx) = bounded(config.command_channel_capacity);
    let _stdin_handle = spawn_stdin_reader(cmd_tx);
    let reason = run_ipc_loop(&mut session, &cmd_rx, crate::timer::TICK_INTERVAL);
    send_event(&IpcEvent::SessionEnd {
        reason: reason.to_string(),
    });
    session.finish();
    log_debug(&format!("IPC session ended: {reason}"));
    Ok(())
}

pub(super) fn emit_session_started(session: &IpcVoiceSession, lang: &str) {
    let snapshot = session.snapshot();
    send_event(&IpcEvent::Session {
        recipe_id: snapshot.recipe_id.clone(),
        title: snapshot.title.clone(),
        steps: snapshot.step_count,
        lang: lang.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });
    send_event(&IpcEvent::step_from(&snapshot));
    send_event(&IpcEvent::timer_from(&snapshot));
}

/// Serially dispatch host commands and countdown ticks. The ticker exists only
/// while the timer runs, so a repeated start cannot add a second tick source.
pub(super) fn run_ipc_loop(
    session: &mut IpcVoiceSession,
    cmd_rx: &Receiver<IpcCommand>,
    tick_interval: Duration,
) -> &'static str {
    let idle: Receiver<Instant> = never();
    let mut ticker: Option<Receiver<Instant>> = None;
    loop {
        if session.needs_tick() {
            if ticker.is_none() {
                ticker = Some(tick(tick_interval));
            }
        } else {
            ticker = None;
        }
        let tick_rx = ticker.as_ref().unwrap_or(&idle);

        select! {
            recv(cmd_rx) -> msg => match msg {
                Ok(cmd) => {
                    if handle_command(session, cmd) == LoopControl::Quit {
                        return "quit";
                    }
                }
                Err(_) => return "input_closed",
            },
            recv(tick_rx) -> _ => handle_tick(session),
        }
    }
}
