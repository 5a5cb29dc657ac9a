//! The task that moves session output into the transcript.
//!
//! A single task consumes stdout lines, stderr lines and supervisor lifecycle
//! events. Each appended item is followed by a repaint request. The
//! transcript lock is held only for the append, never across an await.
//!
//! The supervisor reports `Exited` only after the dead shell's pumps have
//! queued their last lines, and the line channels are polled first, so an
//! exit note always lands below that shell's output.

use std::sync::Arc;

use inkterm_shell::SessionEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::host::DisplayHost;
use crate::i18n::Localizer;
use crate::transcript::Transcript;

/// Channels feeding the bridge.
pub struct BridgeInputs {
    pub output: mpsc::Receiver<String>,
    pub error: mpsc::Receiver<String>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

enum Received {
    Line(String),
    Event(SessionEvent),
}

/// Append shell output and lifecycle notes to the transcript.
///
/// Stops on cancellation, or once all three channels are closed and drained.
/// Only the first spawn failure of a run is written to the transcript; the
/// retries that follow are logged.
pub fn spawn_session_bridge(
    inputs: BridgeInputs,
    transcript: Transcript,
    host: Arc<dyn DisplayHost>,
    localize: Localizer,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let BridgeInputs {
        mut output,
        mut error,
        mut events,
    } = inputs;

    tokio::spawn(async move {
        let (mut output_open, mut error_open, mut events_open) = (true, true, true);
        let mut failing = false;

        while output_open || error_open || events_open {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                line = output.recv(), if output_open => match line {
                    Some(line) => Received::Line(line),
                    None => {
                        output_open = false;
                        continue;
                    }
                },
                line = error.recv(), if error_open => match line {
                    Some(line) => Received::Line(line),
                    None => {
                        error_open = false;
                        continue;
                    }
                },
                event = events.recv(), if events_open => match event {
                    Some(event) => Received::Event(event),
                    None => {
                        events_open = false;
                        continue;
                    }
                },
            };

            let text = match received {
                Received::Line(line) => Some(line),
                Received::Event(event) => note_for(event, &mut failing, &localize),
            };
            if let Some(text) = text {
                transcript.append_line(&text);
                host.request_repaint();
            }
        }
        log::debug!("session bridge stopped");
    })
}

fn note_for(event: SessionEvent, failing: &mut bool, localize: &Localizer) -> Option<String> {
    match event {
        SessionEvent::Spawned { generation, pid } => {
            log::debug!("session generation {generation} running as pid {pid:?}");
            *failing = false;
            None
        }
        SessionEvent::SpawnFailed { message } => {
            let first = !*failing;
            *failing = true;
            first.then(|| localize("spawn_failed").replace("{error}", &message))
        }
        SessionEvent::Exited { code: Some(code), .. } => {
            Some(localize("shell_exited").replace("{code}", &code.to_string()))
        }
        SessionEvent::Exited { code: None, .. } => Some(localize("shell_killed")),
    }
}
