//! JSON IPC mode for a speech host.
//!
//! The host (a browser page, a mobile shell, a test harness) owns the
//! microphone and the synthesizer. This module drives one [`VoiceSession`]
//! over a JSON-lines protocol on stdin/stdout.
//!
//! Architecture:
//! - Stdin reader thread: parses JSON commands, sends them to the main loop
//! - Main loop: applies commands and countdown ticks to the session, one at a time
//!
//! Protocol:
//! - Each line is a JSON object
//! - Events (Rust → host): {"event": "...", ...}
//! - Commands (host → Rust): {"cmd": "...", ...}
//!
//! [`VoiceSession`]: crate::session::VoiceSession

mod protocol;
mod router;
mod session;

#[cfg(test)]
mod tests;

pub use protocol::{IpcCommand, IpcEvent};
pub use session::{run_ipc_mode, IpcSpeaker, IpcSpeechInput};
