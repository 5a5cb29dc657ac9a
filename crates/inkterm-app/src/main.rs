use std::sync::Arc;

use inkterm_app::config::Config;
use inkterm_app::console::{render_frame, ConsoleHost};
use inkterm_app::{TerminalApp, Translations};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::from_env().unwrap_or_else(|e| {
        log::warn!("{e}, using built-in configuration");
        Config::default()
    });
    let localize = Translations::load(&config.language).into_localizer();
    let host = Arc::new(ConsoleHost::new());
    let terminated = host.terminated();

    let app = TerminalApp::start(config.clone(), host.clone(), localize).await;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = terminated.cancelled() => break,
            _ = host.repaint_requested() => {
                let frame =
                    app.on_draw_requested(config.screen_width_px, config.screen_height_px);
                if let Some(frame) = frame {
                    let mut out = std::io::stdout().lock();
                    if let Err(e) = render_frame(&mut out, &frame, config.glyph_width) {
                        log::warn!("failed to draw frame: {e}");
                    }
                }
            }
            line = stdin.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = app.on_text_submitted(&line).await {
                        log::warn!("command not delivered: {e}");
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("stdin read failed: {e}");
                    break;
                }
            },
        }
    }

    let exit = app.shutdown().await;
    log::info!("session ended: {exit:?}");

    // The blocking stdin reader would otherwise hold the runtime open.
    std::process::exit(0);
}

/// Log to stderr so stdout stays reserved for frames.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
