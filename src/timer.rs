//! Countdown timer for timed recipe steps.
//!
//! The timer owns no thread. Whoever drives the session calls [`CountdownTimer::tick`]
//! once per [`TICK_INTERVAL`] while [`CountdownTimer::is_running`] is true.

use crate::speech::{Notice, SpeechOutput};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Cadence of the recurring countdown tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The near-completion alert fires once when the countdown enters `(0, ALERT_WINDOW_SECS]`.
pub const ALERT_WINDOW_SECS: u64 = 10;

/// Seconds for the first `<digits>[ws]min` match in `text`, or 0 when there is none.
///
/// A minute count too large for `u64` also yields 0, so the step reads as having no timer.
pub fn parse_duration(text: &str) -> u64 {
    static MINUTES_RE: OnceLock<Regex> = OnceLock::new();
    let re = MINUTES_RE.get_or_init(|| Regex::new(r"(\d+)\s*min").expect("minutes regex"));
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(|minutes| minutes.saturating_mul(60))
        .unwrap_or(0)
}

/// `MM:SS`, both fields zero-padded; minutes are not wrapped at 60.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub running: bool,
    pub alert_fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStart {
    Started,
    /// A countdown is already in progress; nothing changed.
    AlreadyRunning,
    /// Zero seconds requested; nothing changed.
    NoDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is stopped; the tick was ignored.
    Idle,
    Counting,
    Alerted,
    Finished,
}

#[derive(Debug, Default)]
pub struct CountdownTimer {
    state: TimerState,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn clock(&self) -> String {
        format_clock(self.state.remaining_seconds)
    }

    pub fn start(&mut self, seconds: u64, speech: &mut dyn SpeechOutput) -> TimerStart {
        if self.state.running {
            crate::log_debug("timer start ignored: already running");
            return TimerStart::AlreadyRunning;
        }
        if seconds == 0 {
            return TimerStart::NoDuration;
        }
        self.state = TimerState {
            remaining_seconds: seconds,
            running: true,
            alert_fired: false,
        };
        tracing::info!(seconds, "timer started");
        speech.speak(Notice::TimerStarting.text());
        TimerStart::Started
    }

    pub fn tick(&mut self, speech: &mut dyn SpeechOutput) -> TickOutcome {
        if !self.state.running {
            return TickOutcome::Idle;
        }
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        let remaining = self.state.remaining_seconds;

        if remaining == 0 {
            self.state.running = false;
            tracing::info!("timer finished");
            speech.speak(Notice::TimerFinished.text());
            return TickOutcome::Finished;
        }
        if remaining <= ALERT_WINDOW_SECS && !self.state.alert_fired {
            self.state.alert_fired = true;
            speech.alert();
            return TickOutcome::Alerted;
        }
        TickOutcome::Counting
    }

    /// Stop counting and keep the remaining time. Returns whether a countdown was running.
    pub fn pause(&mut self, speech: &mut dyn SpeechOutput) -> bool {
        let was_running = self.state.running;
        self.state.running = false;
        if was_running {
            tracing::info!(remaining = self.state.remaining_seconds, "timer paused");
        }
        speech.speak(Notice::TimerPaused.text());
        was_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::fake::{RecordingSpeaker, Spoken};

    #[test]
    fn parse_duration_reads_minutes() {
        assert_eq!(parse_duration("Bake for 25 minutes"), 1500);
        assert_eq!(parse_duration("10 min"), 600);
        assert_eq!(parse_duration("simmer 5min then rest"), 300);
        assert_eq!(parse_duration("Mix well"), 0);
        assert_eq!(parse_duration("2 hours"), 0);
    }

    #[test]
    fn parse_duration_treats_overflowing_minutes_as_no_timer() {
        assert_eq!(parse_duration("99999999999999999999 min"), 0);
        assert_eq!(parse_duration("18446744073709551615 min"), u64::MAX);
    }

    #[test]
    fn parse_duration_uses_first_match() {
        assert_eq!(parse_duration("Roast 20-25 minutes"), 1500);
        assert_eq!(parse_duration("3 min, then 7 min"), 180);
    }

    #[test]
    fn format_clock_pads_and_does_not_wrap_minutes() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(61 * 60 + 5), "61:05");
    }

    #[test]
    fn countdown_alerts_once_and_finishes_once() {
        let mut speaker = RecordingSpeaker::new();
        let mut timer = CountdownTimer::new();
        assert_eq!(timer.start(1500, &mut speaker), TimerStart::Started);

        for _ in 0..1489 {
            assert_eq!(timer.tick(&mut speaker), TickOutcome::Counting);
        }
        assert_eq!(timer.tick(&mut speaker), TickOutcome::Alerted);
        assert_eq!(timer.remaining_seconds(), 10);
        assert_eq!(speaker.alert_count(), 1);

        for _ in 0..9 {
            assert_eq!(timer.tick(&mut speaker), TickOutcome::Counting);
        }
        assert_eq!(timer.tick(&mut speaker), TickOutcome::Finished);
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(!timer.is_running());

        for _ in 0..5 {
            assert_eq!(timer.tick(&mut speaker), TickOutcome::Idle);
        }
        assert_eq!(speaker.alert_count(), 1);
        assert_eq!(speaker.count_of(Notice::TimerFinished.text()), 1);
    }

    #[test]
    fn short_timer_alerts_on_first_tick() {
        let mut speaker = RecordingSpeaker::new();
        let mut timer = CountdownTimer::new();
        timer.start(5, &mut speaker);
        assert_eq!(timer.tick(&mut speaker), TickOutcome::Alerted);
        assert_eq!(timer.remaining_seconds(), 4);
    }

    #[test]
    fn second_start_while_running_is_ignored() {
        let mut speaker = RecordingSpeaker::new();
        let mut timer = CountdownTimer::new();
        timer.start(120, &mut speaker);
        timer.tick(&mut speaker);
        assert_eq!(timer.start(600, &mut speaker), TimerStart::AlreadyRunning);
        assert_eq!(timer.remaining_seconds(), 119);
        timer.tick(&mut speaker);
        assert_eq!(timer.remaining_seconds(), 118);
        assert_eq!(speaker.count_of(Notice::TimerStarting.text()), 1);
    }

    #[test]
    fn pause_keeps_remaining_and_restart_resets_alert() {
        let mut speaker = RecordingSpeaker::new();
        let mut timer = CountdownTimer::new();
        timer.start(12, &mut speaker);
        timer.tick(&mut speaker);
        timer.tick(&mut speaker);
        assert!(timer.state().alert_fired);
        assert!(timer.pause(&mut speaker));
        assert_eq!(timer.remaining_seconds(), 10);
        assert_eq!(timer.tick(&mut speaker), TickOutcome::Idle);
        assert_eq!(timer.remaining_seconds(), 10);

        timer.start(12, &mut speaker);
        assert!(!timer.state().alert_fired);
        assert_eq!(timer.remaining_seconds(), 12);
    }

    #[test]
    fn pause_while_stopped_changes_nothing() {
        let mut speaker = RecordingSpeaker::new();
        let mut timer = CountdownTimer::new();
        assert!(!timer.pause(&mut speaker));
        assert_eq!(timer.state(), TimerState::default());
        assert_eq!(speaker.spoken(), vec![Spoken::Text(Notice::TimerPaused.text().to_string())]);
    }

    #[test]
    fn zero_seconds_does_not_start() {
        let mut speaker = RecordingSpeaker::new();
        let mut timer = CountdownTimer::new();
        assert_eq!(timer.start(0, &mut speaker), TimerStart::NoDuration);
        assert!(!timer.is_running());
        assert!(speaker.spoken().is_empty());
    }
}
