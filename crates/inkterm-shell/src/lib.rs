//! inkterm-shell: supervised shell session for inkterm.
//!
//! This crate keeps one shell process alive behind three long-lived line
//! channels. Commands go in on the input channel, stdout and stderr lines come
//! out on their own channels, and the shell is respawned whenever it exits.
//!
//! # Architecture
//!
//! - [`ShellProcess`]: One spawned shell with its three pipes.
//! - [`pump`]: Input, output and error pumps between pipes and channels.
//! - [`ShellSupervisor`]: Spawn / wait / respawn loop that owns the process.
//! - [`resolve_shell`]: Login shell lookup with fallbacks.

pub mod error;
pub mod process;
pub mod pump;
pub mod shell_path;
pub mod supervisor;

pub use error::ShellError;
pub use process::{ShellCommand, ShellPipes, ShellProcess};
pub use shell_path::{resolve_shell, DEFAULT_SHELL};
pub use supervisor::{
    session_channels, SessionEnds, SessionEvent, SessionPeer, ShellSupervisor, SupervisorConfig,
    SupervisorExit, DEFAULT_CHANNEL_CAPACITY,
};
