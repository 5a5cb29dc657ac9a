//! Command dispatch for submitted text.
//!
//! Local meta-commands are handled here; everything else is echoed into the
//! transcript and forwarded to the shell session's input channel.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::host::DisplayHost;
use crate::transcript::Transcript;

/// Commands interpreted locally that never reach the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Clear,
    Exit,
}

impl MetaCommand {
    /// Match the trimmed text against the reserved keywords.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "clear" => Some(Self::Clear),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The supervisor is gone; nothing reads the input channel.
    #[error("shell session is closed")]
    SessionClosed,
}

/// What `submit` did with the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    Cleared,
    Exiting,
    Forwarded,
}

pub struct CommandDispatcher {
    transcript: Transcript,
    input: mpsc::Sender<String>,
    host: Arc<dyn DisplayHost>,
    shutdown: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(
        transcript: Transcript,
        input: mpsc::Sender<String>,
        host: Arc<dyn DisplayHost>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            transcript,
            input,
            host,
            shutdown,
        }
    }

    /// Handle one submitted line.
    ///
    /// The input channel is bounded: when it is full this waits until the
    /// shell catches up. Input is never dropped.
    pub async fn submit(&self, raw: &str) -> Result<Dispatched, DispatchError> {
        if let Some(meta) = MetaCommand::parse(raw) {
            return Ok(self.run_meta(meta));
        }

        self.echo(raw);
        self.input
            .send(raw.to_string())
            .await
            .map_err(|_| self.session_closed(raw))?;
        Ok(Dispatched::Forwarded)
    }

    /// Same as [`submit`](Self::submit) for toolkit callbacks running on a
    /// plain thread. Must not be called from inside the tokio runtime.
    pub fn submit_blocking(&self, raw: &str) -> Result<Dispatched, DispatchError> {
        if let Some(meta) = MetaCommand::parse(raw) {
            return Ok(self.run_meta(meta));
        }

        self.echo(raw);
        self.input
            .blocking_send(raw.to_string())
            .map_err(|_| self.session_closed(raw))?;
        Ok(Dispatched::Forwarded)
    }

    fn echo(&self, raw: &str) {
        self.transcript.echo_command(raw);
        self.host.request_repaint();
    }

    fn run_meta(&self, meta: MetaCommand) -> Dispatched {
        match meta {
            MetaCommand::Clear => {
                self.transcript.clear();
                self.host.request_repaint();
                Dispatched::Cleared
            }
            MetaCommand::Exit => {
                log::info!("exit requested, shutting down");
                self.shutdown.cancel();
                self.host.terminate();
                Dispatched::Exiting
            }
        }
    }

    fn session_closed(&self, raw: &str) -> DispatchError {
        log::warn!("dropping command {raw:?}: shell session is closed");
        DispatchError::SessionClosed
    }
}
