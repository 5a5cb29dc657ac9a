//! Compiled-in configuration with an optional JSON override file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use inkterm_shell::SupervisorConfig;
use inkterm_text::{GlyphCell, Margins};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "INKTERM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glyph height in pixels; also the font size.
    pub font_size: u32,
    /// Glyph width in pixels of the monospace font.
    pub glyph_width: u32,
    pub margin_cols: u32,
    pub margin_rows: u32,
    /// Left indentation of every row, in glyphs.
    pub indent_cols: u32,
    pub screen_width_px: u32,
    pub screen_height_px: u32,
    pub channel_capacity: usize,
    pub spawn_backoff_ms: u64,
    pub respawn_delay_ms: u64,
    pub drain_grace_ms: u64,
    pub language: String,
    /// Shell to run instead of the user's login shell.
    pub shell: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_size: 14,
            glyph_width: 8,
            margin_cols: 6,
            margin_rows: 10,
            indent_cols: 3,
            screen_width_px: 1072,
            screen_height_px: 1448,
            channel_capacity: inkterm_shell::DEFAULT_CHANNEL_CAPACITY,
            spawn_backoff_ms: 1000,
            respawn_delay_ms: 1000,
            drain_grace_ms: 500,
            language: "en".to_string(),
            shell: None,
        }
    }
}

impl Config {
    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn glyph(&self) -> GlyphCell {
        GlyphCell::new(self.glyph_width, self.font_size)
    }

    pub fn margins(&self) -> Margins {
        Margins::new(self.margin_cols, self.margin_rows)
    }

    /// Y coordinate of the first row: one line below the top panel.
    pub fn top_px(&self) -> u32 {
        self.font_size
    }

    pub fn supervisor(&self) -> SupervisorConfig {
        SupervisorConfig {
            spawn_backoff: Duration::from_millis(self.spawn_backoff_ms),
            respawn_delay: Duration::from_millis(self.respawn_delay_ms),
            drain_grace: Duration::from_millis(self.drain_grace_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.font_size, 14);
        assert_eq!(config.margins(), Margins::new(6, 10));
        assert_eq!(config.channel_capacity, 5);
        assert_eq!(config.supervisor(), SupervisorConfig::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"font_size": 20, "language": "ru"}"#).unwrap();
        assert_eq!(config.font_size, 20);
        assert_eq!(config.language, "ru");
        assert_eq!(config.glyph(), GlyphCell::new(8, 20));
        assert_eq!(config.margin_cols, 6);
        assert_eq!(config.shell, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"shell": "/bin/sh", "respawn_delay_ms": 50}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.shell.as_deref(), Some("/bin/sh"));
        assert_eq!(config.supervisor().respawn_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Config::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/inkterm.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/inkterm.json"));
    }
}
