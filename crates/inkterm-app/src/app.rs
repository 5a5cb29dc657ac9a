//! The terminal application: wiring plus the toolkit's event handlers.

use std::sync::Arc;

use inkterm_shell::{
    resolve_shell, session_channels, ShellCommand, ShellSupervisor, SupervisorExit,
};
use inkterm_text::{layout_frame, paginate, Frame, Viewport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bridge::{spawn_session_bridge, BridgeInputs};
use crate::config::Config;
use crate::dispatcher::{CommandDispatcher, DispatchError, Dispatched};
use crate::host::DisplayHost;
use crate::i18n::Localizer;
use crate::state::AppState;
use crate::transcript::Transcript;

/// Command submitted once at startup so the first frame is not blank.
pub const WELCOME_COMMAND: &str = "echo \"Welcome to terminal app!\"";

/// One running terminal: shell supervisor, bridge task and dispatcher.
pub struct TerminalApp {
    config: Config,
    state: Arc<AppState>,
    host: Arc<dyn DisplayHost>,
    localize: Localizer,
    dispatcher: CommandDispatcher,
    supervisor: JoinHandle<SupervisorExit>,
    bridge: JoinHandle<()>,
}

impl TerminalApp {
    /// Start with the configured shell, or the user's login shell.
    pub async fn start(config: Config, host: Arc<dyn DisplayHost>, localize: Localizer) -> Self {
        let program = match &config.shell {
            Some(shell) => shell.clone(),
            None => tokio::task::spawn_blocking(resolve_shell)
                .await
                .unwrap_or_else(|_| inkterm_shell::DEFAULT_SHELL.to_string()),
        };
        Self::start_with_shell(config, host, localize, ShellCommand::new(program)).await
    }

    /// Show the disclaimer, start the session and submit the welcome command.
    pub async fn start_with_shell(
        config: Config,
        host: Arc<dyn DisplayHost>,
        localize: Localizer,
        command: ShellCommand,
    ) -> Self {
        host.show_warning(&localize("welcome_title"), &localize("welcome_body"));

        let state = Arc::new(AppState::new());
        let shutdown = state.shutdown.clone();

        let (ends, peer) = session_channels(config.channel_capacity);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let supervisor = ShellSupervisor::new(command, config.supervisor())
            .with_events(events_tx)
            .spawn(ends, shutdown.child_token());

        let transcript = state.transcript.clone();
        let bridge = spawn_session_bridge(
            BridgeInputs {
                output: peer.output,
                error: peer.error,
                events: events_rx,
            },
            transcript.clone(),
            host.clone(),
            localize.clone(),
            shutdown.clone(),
        );

        let dispatcher = CommandDispatcher::new(transcript, peer.input, host.clone(), shutdown);

        let app = Self {
            config,
            state,
            host,
            localize,
            dispatcher,
            supervisor,
            bridge,
        };

        app.state.set_should_update_screen(true);
        if let Err(e) = app.dispatcher.submit(WELCOME_COMMAND).await {
            log::warn!("welcome command not delivered: {e}");
        }
        app.host.request_repaint();
        app
    }

    pub fn transcript(&self) -> &Transcript {
        &self.state.transcript
    }

    /// Cancelled once `exit` was submitted or `shutdown` was called.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Text entered in the toolkit's keyboard.
    pub async fn on_text_submitted(&self, raw: &str) -> Result<Dispatched, DispatchError> {
        self.state.set_should_update_screen(true);
        self.dispatcher.submit(raw).await
    }

    /// Tap on the screen: hand the screen to the keyboard overlay.
    pub fn on_pointer_down(&self) {
        self.host.request_repaint();
        self.state.set_should_update_screen(false);
        self.host.request_text_input(&(self.localize)("keyboard_prompt"));
    }

    /// Keyboard closed without submitting.
    pub fn on_input_cancelled(&self) {
        self.state.set_should_update_screen(true);
        self.host.request_repaint();
    }

    /// Rows to render for a screen of the given pixel size.
    ///
    /// Returns `None` while the keyboard overlay owns the screen.
    pub fn on_draw_requested(&self, width_px: u32, height_px: u32) -> Option<Frame> {
        if !self.state.should_update_screen() {
            return None;
        }

        let glyph = self.config.glyph();
        let viewport = Viewport::from_screen(width_px, height_px, glyph, self.config.margins());
        let rows = self
            .state
            .transcript
            .with_text(|text| paginate(text, viewport.cols, viewport.rows));
        Some(layout_frame(
            rows,
            viewport,
            glyph,
            self.config.indent_cols,
            self.config.top_px(),
        ))
    }

    /// Stop every task and wait for them. The shell is killed.
    pub async fn shutdown(self) -> SupervisorExit {
        self.state.shutdown.cancel();
        if let Err(e) = self.bridge.await {
            log::warn!("bridge task failed: {e}");
        }
        match self.supervisor.await {
            Ok(exit) => exit,
            Err(e) => {
                log::warn!("supervisor task failed: {e}");
                SupervisorExit::Cancelled
            }
        }
    }
}
