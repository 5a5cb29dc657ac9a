//! Application state shared between the dispatcher, the bridge task and draws.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::transcript::Transcript;

/// State owned by one running terminal and shared with its tasks.
pub struct AppState {
    /// Everything shown on screen, appended by the bridge and the dispatcher.
    pub transcript: Transcript,
    /// Cleared while the toolkit's keyboard overlay owns the screen.
    should_update_screen: AtomicBool,
    /// Cancelled once the application is shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new AppState with an empty transcript and drawing disabled.
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            should_update_screen: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Whether draw requests should produce a frame.
    pub fn should_update_screen(&self) -> bool {
        self.should_update_screen.load(Ordering::Acquire)
    }

    /// Hand the screen to the terminal (`true`) or to the keyboard overlay.
    pub fn set_should_update_screen(&self, value: bool) {
        self.should_update_screen.store(value, Ordering::Release);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
