//! Line pumps between the shell's pipes and the session channels.
//!
//! Each pump runs as its own tokio task for one spawn cycle. Pumps never close
//! the long-lived channels: the input receiver is handed back when the input
//! pump stops, and the output/error pumps only drop their sender clones.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Why the input pump stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputPumpExit {
    /// Every input sender was dropped; the shell's stdin was closed.
    ChannelClosed,
    /// Writing to the shell failed, it is presumed to be exiting.
    WriteFailed,
    Cancelled,
}

/// Result of an input pump: the receiver goes back to the supervisor.
pub struct InputPumpResult {
    pub input: mpsc::Receiver<String>,
    pub exit: InputPumpExit,
}

/// Why an output or error pump stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinePumpExit {
    EndOfStream,
    ReadFailed,
    /// The peer dropped the receiving end of the channel.
    ReceiverGone,
    Cancelled,
}

/// Drain `input` into the shell's stdin, one line per item.
pub async fn input_pump<W>(
    mut stdin: W,
    mut input: mpsc::Receiver<String>,
    cancel: CancellationToken,
) -> InputPumpResult
where
    W: AsyncWrite + Unpin,
{
    let exit = loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break InputPumpExit::Cancelled,
            item = input.recv() => item,
        };

        let Some(line) = item else {
            if let Err(e) = stdin.shutdown().await {
                log::debug!("closing shell stdin failed: {e}");
            }
            break InputPumpExit::ChannelClosed;
        };

        let written = tokio::select! {
            biased;
            _ = cancel.cancelled() => break InputPumpExit::Cancelled,
            res = write_line(&mut stdin, &line) => res,
        };
        if let Err(e) = written {
            log::debug!("input pump stopped: {e}");
            break InputPumpExit::WriteFailed;
        }
    };

    InputPumpResult { input, exit }
}

async fn write_line<W: AsyncWrite + Unpin>(stdin: &mut W, line: &str) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// Read `stream` line by line and publish every line on `lines`.
///
/// A final line without a trailing newline is still delivered.
pub async fn line_pump<R>(
    stream: R,
    lines: mpsc::Sender<String>,
    cancel: CancellationToken,
) -> LinePumpExit
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return LinePumpExit::Cancelled,
            res = reader.read_until(b'\n', &mut buf) => res,
        };

        match read {
            Ok(0) => return LinePumpExit::EndOfStream,
            Ok(_) => {}
            Err(e) => {
                log::debug!("line pump read failed: {e}");
                return LinePumpExit::ReadFailed;
            }
        }

        let line = decode_line(&buf);
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return LinePumpExit::Cancelled,
            res = lines.send(line) => res,
        };
        if sent.is_err() {
            return LinePumpExit::ReceiverGone;
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
