//! JSON-lines protocol between the voice session and its speech host.
//!
//! The host owns the microphone and the synthesizer. It reports recognition
//! results and button presses as commands; the session answers with events
//! telling it what to say and what to display.

use crate::session::SessionSnapshot;
use serde::{Deserialize, Serialize};

// ============================================================================
// IPC Events (session → host)
// ============================================================================

/// Serialized with an `"event"` tag field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum IpcEvent {
    /// Sent once after the recipe loaded
    #[serde(rename = "session")]
    Session {
        recipe_id: String,
        title: String,
        steps: usize,
        lang: String,
        version: String,
    },

    /// Text for the synthesizer
    #[serde(rename = "speak")]
    Speak { text: String },

    /// Near-completion timer cue
    #[serde(rename = "alert")]
    Alert,

    /// Current step changed
    #[serde(rename = "step")]
    Step {
        index: usize,
        total: usize,
        label: String,
        text: String,
    },

    /// Countdown state changed
    #[serde(rename = "timer")]
    Timer {
        remaining: u64,
        clock: String,
        running: bool,
    },

    /// Host should open a recognition stream and tag its events with `handle`
    #[serde(rename = "recognition_start")]
    RecognitionStart { handle: u64, lang: String },

    /// Host should close the recognition stream `handle`
    #[serde(rename = "recognition_stop")]
    RecognitionStop { handle: u64 },

    /// Listening state changed
    #[serde(rename = "listening")]
    Listening { active: bool },

    /// Full state, on request
    #[serde(rename = "status")]
    Status {
        recipe_id: String,
        title: String,
        index: usize,
        total: usize,
        label: String,
        text: String,
        remaining: u64,
        clock: String,
        timer_running: bool,
        listening: bool,
    },

    /// Session is over; no further events follow
    #[serde(rename = "session_end")]
    SessionEnd { reason: String },

    /// Error (recoverable or fatal)
    #[serde(rename = "error")]
    Error { message: String, recoverable: bool },
}

impl IpcEvent {
    pub(crate) fn step_from(snapshot: &SessionSnapshot) -> Self {
        IpcEvent::Step {
            index: snapshot.step_index,
            total: snapshot.step_count,
            label: snapshot.step_label.clone(),
            text: snapshot.step_text.clone(),
        }
    }

    pub(crate) fn timer_from(snapshot: &SessionSnapshot) -> Self {
        IpcEvent::Timer {
            remaining: snapshot.remaining_seconds,
            clock: snapshot.clock.clone(),
            running: snapshot.timer_running,
        }
    }

    pub(crate) fn status_from(snapshot: &SessionSnapshot) -> Self {
        IpcEvent::Status {
            recipe_id: snapshot.recipe_id.clone(),
            title: snapshot.title.clone(),
            index: snapshot.step_index,
            total: snapshot.step_count,
            label: snapshot.step_label.clone(),
            text: snapshot.step_text.clone(),
            remaining: snapshot.remaining_seconds,
            clock: snapshot.clock.clone(),
            timer_running: snapshot.timer_running,
            listening: snapshot.listening == crate::listening::ListeningState::Listening,
        }
    }
}

// ============================================================================
// IPC Commands (host → session)
// ============================================================================

fn default_true() -> bool {
    true
}

/// Commands received from the host, tagged by `"cmd"`.
///
/// Recognition commands may omit `handle`; they then apply to the stream
/// that is currently open.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd")]
pub enum IpcCommand {
    /// User pressed the microphone button
    #[serde(rename = "start_listening")]
    StartListening,

    /// User pressed the stop button
    #[serde(rename = "stop_listening")]
    StopListening,

    /// Recognized speech
    #[serde(rename = "recognition_result")]
    RecognitionResult {
        text: String,
        #[serde(default = "default_true")]
        is_final: bool,
        #[serde(default)]
        handle: Option<u64>,
    },

    /// Recognition stream closed
    #[serde(rename = "recognition_end")]
    RecognitionEnd {
        #[serde(default)]
        handle: Option<u64>,
    },

    /// Recognition stream failed
    #[serde(rename = "recognition_error")]
    RecognitionError {
        kind: String,
        #[serde(default)]
        handle: Option<u64>,
    },

    /// Typed utterance, interpreted like speech
    #[serde(rename = "say")]
    Say { text: String },

    #[serde(rename = "next")]
    Next,

    #[serde(rename = "previous")]
    Previous,

    #[serde(rename = "repeat")]
    Repeat,

    #[serde(rename = "start_timer")]
    StartTimer,

    #[serde(rename = "pause_timer")]
    PauseTimer,

    /// Re-emit the full state
    #[serde(rename = "status")]
    Status,

    /// End the session
    #[serde(rename = "quit")]
    Quit,
}
