use crate::navigator::Command;
use crate::session::SessionSnapshot;
use crate::speech::{RecognitionEvent, RecognitionHandle};
use crate::log_debug;

use super::protocol::{IpcCommand, IpcEvent};
use super::session::{send_event, IpcVoiceSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoopControl {
    Continue,
    Quit,
}

// ============================================================================
// Command Handlers
// ============================================================================

pub(super) fn handle_command(session: &mut IpcVoiceSession, cmd: IpcCommand) -> LoopControl {
    let before = session.snapshot();
    match cmd {
        IpcCommand::StartListening => {
            session.start_listening();
        }
        IpcCommand::StopListening => session.stop_listening(),
        IpcCommand::RecognitionResult {
            text,
            is_final,
            handle,
        } => route_recognition(session, handle, RecognitionEvent::Result { text, is_final }),
        IpcCommand::RecognitionEnd { handle } => {
            route_recognition(session, handle, RecognitionEvent::End)
        }
        IpcCommand::RecognitionError { kind, handle } => {
            route_recognition(session, handle, RecognitionEvent::Error { kind })
        }
        IpcCommand::Say { text } => {
            session.handle_utterance(&text);
        }
        IpcCommand::Next => session.dispatch(Command::Advance),
        IpcCommand::Previous => session.dispatch(Command::Retreat),
        IpcCommand::Repeat => session.dispatch(Command::Repeat),
        IpcCommand::StartTimer => session.dispatch(Command::StartTimer),
        IpcCommand::PauseTimer => session.dispatch(Command::PauseTimer),
        IpcCommand::Status => {
            send_event(&IpcEvent::status_from(&before));
            return LoopControl::Continue;
        }
        IpcCommand::Quit => return LoopControl::Quit,
    }
    emit_changes(&before, &session.snapshot());
    LoopControl::Continue
}

/// One countdown second. The host gets the new clock every tick.
pub(super) fn handle_tick(session: &mut IpcVoiceSession) {
    session.tick();
    send_event(&IpcEvent::timer_from(&session.snapshot()));
}

fn route_recognition(
    session: &mut IpcVoiceSession,
    handle: Option<u64>,
    event: RecognitionEvent,
) {
    let handle = match handle {
        Some(raw) => RecognitionHandle::from_raw(raw),
        None => match session.listening().handle() {
            Some(open) => open,
            None => {
                log_debug("recognition event with no open stream ignored");
                return;
            }
        },
    };
    session.handle_recognition(handle, event);
}

fn emit_changes(before: &SessionSnapshot, after: &SessionSnapshot) {
    if before.step_index != after.step_index {
        send_event(&IpcEvent::step_from(after));
    }
    if before.remaining_seconds != after.remaining_seconds
        || before.timer_running != after.timer_running
    {
        send_event(&IpcEvent::timer_from(after));
    }
    if before.listening != after.listening {
        send_event(&IpcEvent::Listening {
            active: after.listening == crate::listening::ListeningState::Listening,
        });
    }
}
