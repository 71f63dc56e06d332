//! Step cursor over a recipe script and the voice command vocabulary.

use crate::recipe::{Instruction, RecipeScript};
use crate::speech::{Notice, SpeechOutput};

/// What a recognized utterance asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Advance,
    Retreat,
    Repeat,
    StartTimer,
    PauseTimer,
    StopListening,
    Unrecognized,
}

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::Advance => "advance",
            Command::Retreat => "retreat",
            Command::Repeat => "repeat",
            Command::StartTimer => "start_timer",
            Command::PauseTimer => "pause_timer",
            Command::StopListening => "stop_listening",
            Command::Unrecognized => "unrecognized",
        }
    }
}

// Checked top to bottom; multi-word "stop ..." phrases must precede bare "stop".
const COMMAND_KEYWORDS: &[(&[&str], Command)] = &[
    (&["next"], Command::Advance),
    (&["back", "previous", "go back"], Command::Retreat),
    (&["repeat"], Command::Repeat),
    (&["start timer"], Command::StartTimer),
    (&["pause timer", "stop timer"], Command::PauseTimer),
    (&["stop listening", "stop"], Command::StopListening),
];

/// Map an utterance to a command by case-insensitive substring match.
pub fn interpret(utterance: &str) -> Command {
    let lowered = utterance.to_lowercase();
    COMMAND_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(_, command)| *command)
        .unwrap_or(Command::Unrecognized)
}

/// Cursor into a [`RecipeScript`]; the index never leaves `[0, len)`.
#[derive(Debug, Clone)]
pub struct StepNavigator {
    script: RecipeScript,
    index: usize,
}

impl StepNavigator {
    pub fn new(script: RecipeScript) -> Self {
        Self { script, index: 0 }
    }

    pub fn script(&self) -> &RecipeScript {
        &self.script
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn current(&self) -> &Instruction {
        // RecipeScript::new rejects empty scripts and the index is kept in range.
        &self.script.steps()[self.index]
    }

    /// "Step N of M", one-based.
    pub fn position_label(&self) -> String {
        format!("Step {} of {}", self.index + 1, self.len())
    }

    /// Move forward one step. Returns false (and says so) at the last step.
    pub fn advance(&mut self, speech: &mut dyn SpeechOutput) -> bool {
        if self.index + 1 < self.len() {
            self.index += 1;
            self.speak_current(speech);
            true
        } else {
            speech.speak(Notice::LastStep.text());
            false
        }
    }

    /// Move back one step. Returns false (and says so) at the first step.
    pub fn retreat(&mut self, speech: &mut dyn SpeechOutput) -> bool {
        if self.index > 0 {
            self.index -= 1;
            self.speak_current(speech);
            true
        } else {
            speech.speak(Notice::FirstStep.text());
            false
        }
    }

    pub fn repeat_current(&self, speech: &mut dyn SpeechOutput) {
        self.speak_current(speech);
    }

    fn speak_current(&self, speech: &mut dyn SpeechOutput) {
        speech.speak(self.current().text());
    }
}
