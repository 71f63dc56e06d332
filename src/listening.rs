//! Continuous listening built from single-utterance recognition streams.
//!
//! `Idle -> Listening` opens a stream. Every end-of-stream while `Listening`
//! opens a fresh one. A user stop or a recognition error returns to `Idle`.
//! Only events tagged with the currently open handle are honored, so an end
//! event that was already queued when the user stopped cannot reopen a stream.

use crate::speech::{Notice, RecognitionHandle, SpeechInput, SpeechOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    Idle,
    Listening,
}

impl ListeningState {
    pub fn label(self) -> &'static str {
        match self {
            ListeningState::Idle => "idle",
            ListeningState::Listening => "listening",
        }
    }
}

/// Result of an end-of-stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Restarted(RecognitionHandle),
    /// Reopening failed; the controller fell back to `Idle`.
    RestartFailed,
    /// Stale handle or not listening.
    Ignored,
}

#[derive(Debug)]
pub struct ListeningController {
    state: ListeningState,
    handle: Option<RecognitionHandle>,
    restarts: u64,
}

impl Default for ListeningController {
    fn default() -> Self {
        Self::new()
    }
}

impl ListeningController {
    pub fn new() -> Self {
        Self {
            state: ListeningState::Idle,
            handle: None,
            restarts: 0,
        }
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    pub fn handle(&self) -> Option<RecognitionHandle> {
        self.handle
    }

    /// Streams reopened after an end event since the session started.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Whether events from `handle` belong to the open stream.
    pub fn accepts(&self, handle: RecognitionHandle) -> bool {
        self.is_listening() && self.handle == Some(handle)
    }

    /// Open a stream. Returns false if already listening or the engine refused.
    pub fn start(&mut self, input: &mut dyn SpeechInput, speech: &mut dyn SpeechOutput) -> bool {
        if self.is_listening() {
            return false;
        }
        match input.start_continuous() {
            Ok(handle) => {
                self.state = ListeningState::Listening;
                self.handle = Some(handle);
                tracing::info!(
                    handle = handle.id(),
                    state = self.state.label(),
                    "listening started"
                );
                true
            }
            Err(err) => {
                crate::log_debug(&format!("speech recognition unavailable: {err:#}"));
                speech.speak(Notice::RecognitionUnavailable.text());
                false
            }
        }
    }

    /// User-initiated stop: drop the restart policy and close the open stream.
    pub fn stop(&mut self, input: &mut dyn SpeechInput, speech: &mut dyn SpeechOutput) {
        self.state = ListeningState::Idle;
        if let Some(handle) = self.handle.take() {
            input.stop(handle);
            tracing::info!(
                handle = handle.id(),
                state = self.state.label(),
                "listening stopped"
            );
        }
        speech.speak(Notice::StoppedListening.text());
    }

    pub fn on_end(
        &mut self,
        handle: RecognitionHandle,
        input: &mut dyn SpeechInput,
        speech: &mut dyn SpeechOutput,
    ) -> StreamEnd {
        if !self.accepts(handle) {
            return StreamEnd::Ignored;
        }
        self.handle = None;
        match input.start_continuous() {
            Ok(next) => {
                self.handle = Some(next);
                self.restarts += 1;
                crate::log_debug(&format!(
                    "recognition stream {} ended; reopened as {}",
                    handle.id(),
                    next.id()
                ));
                StreamEnd::Restarted(next)
            }
            Err(err) => {
                self.state = ListeningState::Idle;
                crate::log_debug(&format!("recognition restart failed: {err:#}"));
                tracing::warn!("recognition restart failed");
                speech.speak(Notice::RecognitionUnavailable.text());
                StreamEnd::RestartFailed
            }
        }
    }

    /// Returns true when the error closed the open stream.
    pub fn on_error(
        &mut self,
        handle: RecognitionHandle,
        kind: &str,
        input: &mut dyn SpeechInput,
        speech: &mut dyn SpeechOutput,
    ) -> bool {
        if !self.accepts(handle) {
            return false;
        }
        self.state = ListeningState::Idle;
        self.handle = None;
        input.stop(handle);
        crate::log_debug(&format!("recognition error on stream {}: {kind}", handle.id()));
        tracing::warn!(
            kind,
            state = self.state.label(),
            "recognition error; listening stopped"
        );
        speech.speak(Notice::RecognitionFailed.text());
        true
    }
}
