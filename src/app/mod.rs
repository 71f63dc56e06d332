//! Process-wide runtime plumbing shared by the binary and the IPC session.

mod logging;

pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
