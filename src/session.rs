//! One voice-guided walkthrough of a single recipe.
//!
//! A [`VoiceSession`] owns the step cursor, the countdown, and the listening
//! state for its recipe. Every input (recognized speech, timer ticks, button
//! presses) is fed through `&mut self`, one at a time, in arrival order.

use crate::listening::{ListeningController, ListeningState, StreamEnd};
use crate::navigator::{interpret, Command, StepNavigator};
use crate::recipe::{RecipeScript, RecipeStore, StoreError};
use crate::speech::{Notice, RecognitionEvent, RecognitionHandle, SpeechInput, SpeechOutput};
use crate::timer::{CountdownTimer, TickOutcome, TimerStart};
use crate::log_debug_content;

/// Point-in-time view used by hosts to render the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub recipe_id: String,
    pub title: String,
    pub step_index: usize,
    pub step_count: usize,
    pub step_label: String,
    pub step_text: String,
    pub remaining_seconds: u64,
    pub clock: String,
    pub timer_running: bool,
    pub listening: ListeningState,
}

pub struct VoiceSession<S, I> {
    navigator: StepNavigator,
    timer: CountdownTimer,
    listening: ListeningController,
    speech: S,
    input: I,
}

impl<S: SpeechOutput, I: SpeechInput> VoiceSession<S, I> {
    pub fn new(script: RecipeScript, speech: S, input: I) -> Self {
        tracing::info!(
            recipe_id = script.recipe_id(),
            steps = script.len(),
            "voice session created"
        );
        Self {
            navigator: StepNavigator::new(script),
            timer: CountdownTimer::new(),
            listening: ListeningController::new(),
            speech,
            input,
        }
    }

    /// Fetch `recipe_id` and build a session. A missing or unreadable recipe
    /// is announced and returned; the caller ends the session.
    pub fn load(
        store: &dyn RecipeStore,
        recipe_id: &str,
        mut speech: S,
        input: I,
    ) -> Result<Self, StoreError> {
        match store.fetch_recipe(recipe_id) {
            Ok(script) => Ok(Self::new(script, speech, input)),
            Err(err) => {
                let notice = if err.is_not_found() {
                    Notice::RecipeNotFound
                } else {
                    Notice::RecipeLoadFailed
                };
                tracing::warn!(recipe_id, error = %err, "recipe load failed");
                speech.speak(notice.text());
                Err(err)
            }
        }
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn listening(&self) -> &ListeningController {
        &self.listening
    }

    /// True while the countdown needs a tick every second.
    pub fn needs_tick(&self) -> bool {
        self.timer.is_running()
    }

    /// Interpret one finalized utterance and act on it.
    pub fn handle_utterance(&mut self, utterance: &str) -> Command {
        let command = interpret(utterance);
        log_debug_content(&format!("utterance {utterance:?} -> {}", command.label()));
        tracing::debug!(command = command.label(), "voice command");
        self.dispatch(command);
        command
    }

    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::Advance => {
                self.navigator.advance(&mut self.speech);
            }
            Command::Retreat => {
                self.navigator.retreat(&mut self.speech);
            }
            Command::Repeat => self.navigator.repeat_current(&mut self.speech),
            Command::StartTimer => {
                self.start_timer();
            }
            Command::PauseTimer => {
                self.timer.pause(&mut self.speech);
            }
            Command::StopListening => self.stop_listening(),
            Command::Unrecognized => self.speech.speak(Notice::NotUnderstood.text()),
        }
    }

    /// Start the countdown from the current step's timer, if it has one.
    pub fn start_timer(&mut self) -> TimerStart {
        let seconds = self.navigator.current().timer_seconds();
        let outcome = self.timer.start(seconds, &mut self.speech);
        if outcome == TimerStart::NoDuration {
            self.speech.speak(Notice::NoTimer.text());
        }
        outcome
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.timer.tick(&mut self.speech)
    }

    pub fn start_listening(&mut self) -> bool {
        self.listening.start(&mut self.input, &mut self.speech)
    }

    pub fn stop_listening(&mut self) {
        self.listening.stop(&mut self.input, &mut self.speech);
    }

    /// Route one event from a recognition stream. Non-final results and
    /// events from streams that are no longer open are dropped.
    pub fn handle_recognition(&mut self, handle: RecognitionHandle, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result { text, is_final } => {
                if !is_final || !self.listening.accepts(handle) {
                    return;
                }
                self.handle_utterance(&text);
            }
            RecognitionEvent::End => {
                if let StreamEnd::Restarted(next) =
                    self.listening
                        .on_end(handle, &mut self.input, &mut self.speech)
                {
                    tracing::debug!(handle = next.id(), "recognition stream reopened");
                }
            }
            RecognitionEvent::Error { kind } => {
                self.listening
                    .on_error(handle, &kind, &mut self.input, &mut self.speech);
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let script = self.navigator.script();
        SessionSnapshot {
            recipe_id: script.recipe_id().to_string(),
            title: script.title().to_string(),
            step_index: self.navigator.current_index(),
            step_count: self.navigator.len(),
            step_label: self.navigator.position_label(),
            step_text: self.navigator.current().text().to_string(),
            remaining_seconds: self.timer.remaining_seconds(),
            clock: self.timer.clock(),
            timer_running: self.timer.is_running(),
            listening: self.listening.state(),
        }
    }

    /// End the session, closing any open recognition stream without a spoken notice.
    pub fn finish(mut self) -> (S, I) {
        if let Some(handle) = self.listening.handle() {
            self.input.stop(handle);
        }
        tracing::info!(
            recipe_id = self.navigator.script().recipe_id(),
            "voice session ended"
        );
        (self.speech, self.input)
    }
}
