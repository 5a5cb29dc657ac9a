//! inkterm-app: transcript, command dispatch and display bridge for inkterm.
//!
//! Wires the shell supervisor from `inkterm-shell` to a display host. Shell
//! output is appended to the [`Transcript`], the host is asked to repaint, and
//! every draw runs the paginator from `inkterm-text` over the transcript.

pub mod app;
pub mod bridge;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod host;
pub mod i18n;
pub mod state;
pub mod transcript;

pub use app::TerminalApp;
pub use config::{Config, ConfigError};
pub use dispatcher::{CommandDispatcher, DispatchError, Dispatched, MetaCommand};
pub use host::DisplayHost;
pub use i18n::{Localizer, Translations};
pub use transcript::Transcript;
