//! Boundary with the display toolkit.

/// Calls the core makes into the display toolkit.
///
/// Modal text entry is asynchronous: `request_text_input` only opens the
/// keyboard, and the toolkit later reports the result through
/// [`TerminalApp::on_text_submitted`](crate::TerminalApp::on_text_submitted)
/// or [`TerminalApp::on_input_cancelled`](crate::TerminalApp::on_input_cancelled).
pub trait DisplayHost: Send + Sync {
    /// Schedule a draw. The toolkit answers by calling `on_draw_requested`.
    fn request_repaint(&self);

    fn show_warning(&self, title: &str, body: &str);

    fn request_text_input(&self, prompt: &str);

    /// End the whole application.
    fn terminate(&self);
}
