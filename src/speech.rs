//! Speech capability seams.
//!
//! The session never talks to an audio engine directly. It speaks through a
//! [`SpeechOutput`] and opens recognition streams through a [`SpeechInput`];
//! the host delivers each stream's events back as [`RecognitionEvent`]s tagged
//! with the [`RecognitionHandle`] they belong to.

use anyhow::Result;

/// Phrase spoken for the near-completion timer alert.
pub const ALERT_PHRASE: &str = "beep";

/// Fixed spoken feedback phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LastStep,
    FirstStep,
    NotUnderstood,
    NoTimer,
    TimerStarting,
    TimerPaused,
    TimerFinished,
    StoppedListening,
    RecognitionUnavailable,
    RecognitionFailed,
    RecipeNotFound,
    RecipeLoadFailed,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::LastStep => "You are at the last step.",
            Notice::FirstStep => "You are at the first step.",
            Notice::NotUnderstood => "Sorry, I did not understand that command.",
            Notice::NoTimer => "No timer found in this step.",
            Notice::TimerStarting => "Starting timer",
            Notice::TimerPaused => "Timer paused",
            Notice::TimerFinished => "Timer finished!",
            Notice::StoppedListening => "Stopped listening",
            Notice::RecognitionUnavailable => "Speech recognition is not available.",
            Notice::RecognitionFailed => "Speech recognition stopped after an error.",
            Notice::RecipeNotFound => "Recipe not found",
            Notice::RecipeLoadFailed => "Failed to load recipe",
        }
    }
}

/// Fire-and-forget text-to-speech.
pub trait SpeechOutput {
    fn speak(&mut self, text: &str);

    /// Audible near-completion cue.
    fn alert(&mut self) {
        self.speak(ALERT_PHRASE);
    }
}

/// Identifies one open/close cycle of a recognition stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognitionHandle(u64);

impl RecognitionHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Events a recognition stream reports back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Result { text: String, is_final: bool },
    /// The stream closed (utterance boundary, silence timeout, transient error).
    End,
    Error { kind: String },
}

/// Speech-to-text engine that delivers one utterance per open stream.
pub trait SpeechInput {
    fn start_continuous(&mut self) -> Result<RecognitionHandle>;
    fn stop(&mut self, handle: RecognitionHandle);
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for Box<T> {
    fn speak(&mut self, text: &str) {
        (**self).speak(text);
    }

    fn alert(&mut self) {
        (**self).alert();
    }
}

impl<T: SpeechInput + ?Sized> SpeechInput for Box<T> {
    fn start_continuous(&mut self) -> Result<RecognitionHandle> {
        (**self).start_continuous()
    }

    fn stop(&mut self, handle: RecognitionHandle) {
        (**self).stop(handle);
    }
}

/// Scripted stand-ins for the speech engines.
#[cfg(any(test, feature = "mutants"))]
pub mod fake {
    use super::{RecognitionEvent, RecognitionHandle, SpeechInput, SpeechOutput, ALERT_PHRASE};
    use crate::lock_or_recover;
    use anyhow::{bail, Result};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Spoken {
        Text(String),
        Alert,
    }

    /// Records everything spoken. Clones share one log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSpeaker {
        log: Arc<Mutex<Vec<Spoken>>>,
    }

    impl RecordingSpeaker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn spoken(&self) -> Vec<Spoken> {
            lock_or_recover(&self.log, "RecordingSpeaker::spoken").clone()
        }

        pub fn texts(&self) -> Vec<String> {
            self.spoken()
                .into_iter()
                .map(|entry| match entry {
                    Spoken::Text(text) => text,
                    Spoken::Alert => ALERT_PHRASE.to_string(),
                })
                .collect()
        }

        pub fn last_text(&self) -> Option<String> {
            self.texts().pop()
        }

        pub fn count_of(&self, text: &str) -> usize {
            self.spoken()
                .iter()
                .filter(|entry| matches!(entry, Spoken::Text(t) if t == text))
                .count()
        }

        pub fn alert_count(&self) -> usize {
            self.spoken()
                .iter()
                .filter(|entry| matches!(entry, Spoken::Alert))
                .count()
        }

        pub fn clear(&self) {
            lock_or_recover(&self.log, "RecordingSpeaker::clear").clear();
        }
    }

    impl SpeechOutput for RecordingSpeaker {
        fn speak(&mut self, text: &str) {
            lock_or_recover(&self.log, "RecordingSpeaker::speak").push(Spoken::Text(text.to_string()));
        }

        fn alert(&mut self) {
            lock_or_recover(&self.log, "RecordingSpeaker::alert").push(Spoken::Alert);
        }
    }

    #[derive(Debug, Default)]
    struct InputLog {
        next_id: u64,
        started: Vec<RecognitionHandle>,
        stopped: Vec<RecognitionHandle>,
        failing_starts: usize,
        utterances: VecDeque<String>,
        pending: VecDeque<(RecognitionHandle, RecognitionEvent)>,
    }

    /// Hands out sequential handles. Each opened stream consumes one scripted
    /// utterance and queues its final result followed by an end event, matching
    /// a single-utterance engine.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedSpeechInput {
        log: Arc<Mutex<InputLog>>,
    }

    impl ScriptedSpeechInput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_utterances<I, S>(utterances: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let input = Self::default();
            lock_or_recover(&input.log, "ScriptedSpeechInput::with_utterances")
                .utterances
                .extend(utterances.into_iter().map(Into::into));
            input
        }

        /// Make the next `count` calls to `start_continuous` fail.
        pub fn fail_next_starts(&self, count: usize) {
            lock_or_recover(&self.log, "ScriptedSpeechInput::fail_next_starts").failing_starts =
                count;
        }

        pub fn started(&self) -> Vec<RecognitionHandle> {
            lock_or_recover(&self.log, "ScriptedSpeechInput::started")
                .started
                .clone()
        }

        pub fn stopped(&self) -> Vec<RecognitionHandle> {
            lock_or_recover(&self.log, "ScriptedSpeechInput::stopped")
                .stopped
                .clone()
        }

        pub fn take_pending(&self) -> Vec<(RecognitionHandle, RecognitionEvent)> {
            lock_or_recover(&self.log, "ScriptedSpeechInput::take_pending")
                .pending
                .drain(..)
                .collect()
        }
    }

    impl SpeechInput for ScriptedSpeechInput {
        fn start_continuous(&mut self) -> Result<RecognitionHandle> {
            let mut log = lock_or_recover(&self.log, "ScriptedSpeechInput::start_continuous");
            if log.failing_starts > 0 {
                log.failing_starts -= 1;
                bail!("recognition engine unavailable");
            }
            log.next_id += 1;
            let handle = RecognitionHandle::from_raw(log.next_id);
            log.started.push(handle);
            if let Some(text) = log.utterances.pop_front() {
                log.pending.push_back((
                    handle,
                    RecognitionEvent::Result {
                        text,
                        is_final: true,
                    },
                ));
                log.pending.push_back((handle, RecognitionEvent::End));
            }
            Ok(handle)
        }

        fn stop(&mut self, handle: RecognitionHandle) {
            lock_or_recover(&self.log, "ScriptedSpeechInput::stop")
                .stopped
                .push(handle);
        }
    }
}
