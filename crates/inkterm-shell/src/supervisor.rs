use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::process::{ShellCommand, ShellProcess};
use crate::pump::{input_pump, line_pump, InputPumpExit, InputPumpResult, LinePumpExit};

/// Default bound of each session channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 5;

/// Timing knobs for the respawn loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Wait after a failed spawn before retrying.
    pub spawn_backoff: Duration,
    /// Wait after the shell exited before spawning a new one.
    pub respawn_delay: Duration,
    /// How long output/error pumps may keep draining after the shell exited.
    pub drain_grace: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            spawn_backoff: Duration::from_secs(1),
            respawn_delay: Duration::from_secs(1),
            drain_grace: Duration::from_millis(500),
        }
    }
}

/// Lifecycle notifications from the supervisor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Spawned { generation: u64, pid: Option<u32> },
    SpawnFailed { message: String },
    /// The shell exited. `code` is `None` when it was killed by a signal.
    Exited { generation: u64, code: Option<i32> },
}

/// How the supervisor loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorExit {
    /// The cancellation token fired; the shell was killed.
    Cancelled,
    /// Every input sender was dropped and the shell exited after end-of-input.
    InputClosed,
}

/// Supervisor side of the session channels.
pub struct SessionEnds {
    input: mpsc::Receiver<String>,
    output: mpsc::Sender<String>,
    error: mpsc::Sender<String>,
}

/// Peer side of the session channels, held by the dispatcher and the bridge.
pub struct SessionPeer {
    pub input: mpsc::Sender<String>,
    pub output: mpsc::Receiver<String>,
    pub error: mpsc::Receiver<String>,
}

/// Create the three long-lived session channels.
///
/// They outlive every individual shell process, so peers never notice a
/// respawn.
pub fn session_channels(capacity: usize) -> (SessionEnds, SessionPeer) {
    let capacity = capacity.max(1);
    let (input_tx, input_rx) = mpsc::channel(capacity);
    let (output_tx, output_rx) = mpsc::channel(capacity);
    let (error_tx, error_rx) = mpsc::channel(capacity);

    (
        SessionEnds {
            input: input_rx,
            output: output_tx,
            error: error_tx,
        },
        SessionPeer {
            input: input_tx,
            output: output_rx,
            error: error_rx,
        },
    )
}

/// Keeps one shell alive, respawning it whenever it exits.
///
/// The supervisor is the only owner of the process handle. Each spawn cycle
/// gets a fresh pump triple, and the previous triple is joined before the
/// next spawn.
pub struct ShellSupervisor {
    command: ShellCommand,
    config: SupervisorConfig,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    generation: u64,
}

impl ShellSupervisor {
    pub fn new(command: ShellCommand, config: SupervisorConfig) -> Self {
        Self {
            command,
            config,
            events: None,
            generation: 0,
        }
    }

    /// Report lifecycle events on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run the supervisor loop on a tokio task.
    pub fn spawn(self, ends: SessionEnds, cancel: CancellationToken) -> JoinHandle<SupervisorExit> {
        tokio::spawn(self.run(ends, cancel))
    }

    /// Spawn, wait, respawn until cancelled or until input is closed.
    pub async fn run(mut self, ends: SessionEnds, cancel: CancellationToken) -> SupervisorExit {
        let SessionEnds {
            mut input,
            output,
            error,
        } = ends;

        loop {
            if cancel.is_cancelled() {
                return SupervisorExit::Cancelled;
            }

            let (mut process, pipes) = match ShellProcess::spawn(&self.command) {
                Ok(spawned) => spawned,
                Err(e) => {
                    log::warn!("failed to start {}: {e}", self.command.program());
                    self.emit(SessionEvent::SpawnFailed {
                        message: e.to_string(),
                    });
                    if sleep_or_cancelled(self.config.spawn_backoff, &cancel).await {
                        return SupervisorExit::Cancelled;
                    }
                    continue;
                }
            };

            self.generation += 1;
            let generation = self.generation;
            let pid = process.id();
            log::info!("shell started (generation {generation}, pid {pid:?})");
            self.emit(SessionEvent::Spawned { generation, pid });

            let input_cancel = cancel.child_token();
            let stream_cancel = cancel.child_token();
            let input_task = tokio::spawn(input_pump(pipes.stdin, input, input_cancel.clone()));
            let stdout_task =
                tokio::spawn(line_pump(pipes.stdout, output.clone(), stream_cancel.clone()));
            let stderr_task =
                tokio::spawn(line_pump(pipes.stderr, error.clone(), stream_cancel.clone()));

            let waited = tokio::select! {
                status = process.wait() => Some(status),
                _ = cancel.cancelled() => None,
            };

            let Some(waited) = waited else {
                if let Err(e) = process.kill().await {
                    log::warn!("failed to kill shell (generation {generation}): {e}");
                }
                join_input(input_task).await;
                join_streams(stdout_task, stderr_task).await;
                log::info!("shell supervisor cancelled");
                return SupervisorExit::Cancelled;
            };

            let code = match waited {
                Ok(status) => {
                    log::info!("shell exited (generation {generation}): {status}");
                    status.code()
                }
                Err(e) => {
                    log::warn!("waiting for shell failed (generation {generation}): {e}");
                    None
                }
            };

            input_cancel.cancel();
            let Some(pumped) = join_input(input_task).await else {
                stream_cancel.cancel();
                join_streams(stdout_task, stderr_task).await;
                self.emit(SessionEvent::Exited { generation, code });
                return SupervisorExit::Cancelled;
            };
            input = pumped.input;

            drain_streams(stdout_task, stderr_task, self.config.drain_grace, &stream_cancel).await;
            self.emit(SessionEvent::Exited { generation, code });

            if pumped.exit == InputPumpExit::ChannelClosed {
                log::info!("input channel closed, shell supervisor stopping");
                return SupervisorExit::InputClosed;
            }

            if sleep_or_cancelled(self.config.respawn_delay, &cancel).await {
                return SupervisorExit::Cancelled;
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Sleep for `duration`. Returns `true` if `cancel` fired first.
async fn sleep_or_cancelled(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = cancel.cancelled() => true,
    }
}

/// Wait for the input pump and take the receiver back.
///
/// Returns `None` when the task was cancelled by the runtime; the receiver is
/// lost with it. A panic in the pump is propagated.
async fn join_input(task: JoinHandle<InputPumpResult>) -> Option<InputPumpResult> {
    match task.await {
        Ok(result) => Some(result),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            log::warn!("input pump did not finish: {e}");
            None
        }
    }
}

async fn join_streams(stdout: JoinHandle<LinePumpExit>, stderr: JoinHandle<LinePumpExit>) {
    let (out, err) = tokio::join!(stdout, stderr);
    log::debug!("stream pumps stopped: stdout {out:?}, stderr {err:?}");
}

/// Let the stream pumps deliver what the shell already wrote, then stop them.
async fn drain_streams(
    stdout: JoinHandle<LinePumpExit>,
    stderr: JoinHandle<LinePumpExit>,
    grace: Duration,
    stream_cancel: &CancellationToken,
) {
    let joined = join_streams(stdout, stderr);
    tokio::pin!(joined);

    tokio::select! {
        _ = &mut joined => {}
        _ = tokio::time::sleep(grace) => {
            log::debug!("stream pumps still open after exit, cancelling");
            stream_cancel.cancel();
            joined.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(10);

    fn fast_config() -> SupervisorConfig {
        SupervisorConfig {
            spawn_backoff: Duration::from_millis(20),
            respawn_delay: Duration::from_millis(20),
            drain_grace: Duration::from_millis(200),
        }
    }

    async fn recv(rx: &mut mpsc::Receiver<String>) -> String {
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for a line")
            .expect("channel closed")
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for an event")
            .expect("event channel closed")
    }

    async fn wait_for_generation(
        rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
        wanted: u64,
    ) -> Vec<SessionEvent> {
        let mut seen = Vec::new();
        loop {
            let event = next_event(rx).await;
            let done = matches!(
                event,
                SessionEvent::Spawned { generation, .. } if generation == wanted
            );
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    #[tokio::test]
    async fn test_join_input_survives_aborted_pump() {
        let task = tokio::spawn(std::future::pending::<InputPumpResult>());
        task.abort();
        assert!(join_input(task).await.is_none());
    }

    #[tokio::test]
    async fn test_join_input_returns_receiver() {
        let (_tx, rx) = mpsc::channel::<String>(1);
        let task = tokio::spawn(async move {
            InputPumpResult {
                input: rx,
                exit: InputPumpExit::Cancelled,
            }
        });
        let pumped = join_input(task).await.unwrap();
        assert_eq!(pumped.exit, InputPumpExit::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_echo_round_trip() {
        let (ends, mut peer) = session_channels(DEFAULT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = ShellSupervisor::new(ShellCommand::new("/bin/sh"), fast_config())
            .spawn(ends, cancel.clone());

        peer.input.send("echo hi".to_string()).await.unwrap();
        assert_eq!(recv(&mut peer.output).await, "hi");

        peer.input.send("echo oops 1>&2".to_string()).await.unwrap();
        assert_eq!(recv(&mut peer.error).await, "oops");

        cancel.cancel();
        let exit = tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
        assert_eq!(exit, SupervisorExit::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_respawns_after_shell_exit() {
        let (ends, mut peer) = session_channels(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = ShellSupervisor::new(ShellCommand::new("/bin/sh"), fast_config())
            .with_events(events_tx)
            .spawn(ends, cancel.clone());

        wait_for_generation(&mut events, 1).await;
        peer.input.send("exit 3".to_string()).await.unwrap();

        let seen = wait_for_generation(&mut events, 2).await;
        assert!(seen.contains(&SessionEvent::Exited {
            generation: 1,
            code: Some(3)
        }));

        // Same channels, new process.
        peer.input.send("echo again".to_string()).await.unwrap();
        assert_eq!(recv(&mut peer.output).await, "again");

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), SupervisorExit::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_usable_after_repeated_immediate_exits() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("count");
        // Exits immediately on the first three starts, then becomes a real shell.
        let script = concat!(
            r#"n=$(cat "$1" 2>/dev/null || echo 0); n=$((n+1)); echo "$n" > "$1"; "#,
            r#"[ "$n" -gt 3 ] || exit 1; exec /bin/sh"#,
        );
        let command = ShellCommand::new("/bin/sh").args([
            "-c",
            script,
            "flaky",
            counter.to_str().unwrap(),
        ]);

        let (ends, mut peer) = session_channels(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = ShellSupervisor::new(command, fast_config())
            .with_events(events_tx)
            .spawn(ends, cancel.clone());

        let seen = wait_for_generation(&mut events, 4).await;

        // Spawned and Exited strictly alternate: one live process at a time.
        let lifecycle: Vec<&SessionEvent> = seen
            .iter()
            .filter(|e| !matches!(e, SessionEvent::SpawnFailed { .. }))
            .collect();
        for (i, event) in lifecycle.iter().enumerate() {
            let generation = (i / 2 + 1) as u64;
            if i % 2 == 0 {
                assert!(matches!(
                    event,
                    SessionEvent::Spawned { generation: g, .. } if *g == generation
                ));
            } else {
                assert_eq!(**event, SessionEvent::Exited { generation, code: Some(1) });
            }
        }
        assert_eq!(lifecycle.len(), 7);

        peer.input.send("echo ready".to_string()).await.unwrap();
        assert_eq!(recv(&mut peer.output).await, "ready");

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), SupervisorExit::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_failure_is_retried() {
        let (ends, _peer) = session_channels(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let missing = ShellCommand::new("/nonexistent/inkterm-shell");
        let handle = ShellSupervisor::new(missing, fast_config())
            .with_events(events_tx)
            .spawn(ends, cancel.clone());

        for _ in 0..3 {
            assert!(matches!(next_event(&mut events).await, SessionEvent::SpawnFailed { .. }));
        }

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), SupervisorExit::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_closing_input_stops_supervisor() {
        let (ends, mut peer) = session_channels(DEFAULT_CHANNEL_CAPACITY);
        let handle = ShellSupervisor::new(ShellCommand::new("/bin/sh"), fast_config())
            .spawn(ends, CancellationToken::new());

        peer.input.send("echo last".to_string()).await.unwrap();
        drop(peer.input);

        assert_eq!(recv(&mut peer.output).await, "last");
        let exit = tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
        assert_eq!(exit, SupervisorExit::InputClosed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_background_child_does_not_block_respawn() {
        let (ends, mut peer) = session_channels(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = ShellSupervisor::new(ShellCommand::new("/bin/sh"), fast_config())
            .with_events(events_tx)
            .spawn(ends, cancel.clone());

        wait_for_generation(&mut events, 1).await;
        // The sleeping grandchild keeps stdout open after the shell exits.
        peer.input.send("sleep 30 & exit 0".to_string()).await.unwrap();
        wait_for_generation(&mut events, 2).await;

        peer.input.send("echo alive".to_string()).await.unwrap();
        assert_eq!(recv(&mut peer.output).await, "alive");

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), SupervisorExit::Cancelled);
    }
}
