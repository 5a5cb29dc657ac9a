//! Line-oriented console stand-in for the e-ink toolkit.
//!
//! Submitted text comes from stdin, every repaint prints a frame to stdout.

use std::io::{self, Write};

use inkterm_text::Frame;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::host::DisplayHost;

#[derive(Default)]
pub struct ConsoleHost {
    repaint: Notify,
    terminated: CancellationToken,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a repaint was requested. Requests made while nobody
    /// waits are kept, and several of them collapse into one.
    pub async fn repaint_requested(&self) {
        self.repaint.notified().await;
    }

    /// Cancelled when the app asked to terminate.
    pub fn terminated(&self) -> CancellationToken {
        self.terminated.clone()
    }
}

impl DisplayHost for ConsoleHost {
    fn request_repaint(&self) {
        self.repaint.notify_one();
    }

    fn show_warning(&self, title: &str, body: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{title}\n\n{body}\n");
        let _ = out.flush();
    }

    fn request_text_input(&self, prompt: &str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{prompt}: ");
        let _ = out.flush();
    }

    fn terminate(&self) {
        self.terminated.cancel();
    }
}

/// Print a frame: a ruler as wide as the viewport, then the rows at their
/// indentation.
pub fn render_frame<W: Write>(out: &mut W, frame: &Frame, glyph_width: u32) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(frame.viewport.cols.max(1)))?;
    for line in &frame.lines {
        let indent = line.x.checked_div(glyph_width).unwrap_or(0) as usize;
        writeln!(out, "{:indent$}{}", "", line.text)?;
    }
    out.flush()
}
