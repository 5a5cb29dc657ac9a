use crate::viewport::{GlyphCell, Viewport};
use crate::wrap::wrap_transcript;

/// Compute the display rows for one frame.
///
/// The transcript is wrapped at `max_chars_per_line` and only the last
/// `max_visible_lines` rows are kept; older rows scroll off the top.
pub fn paginate(
    transcript: &str,
    max_chars_per_line: usize,
    max_visible_lines: usize,
) -> Vec<String> {
    if transcript.is_empty() || max_chars_per_line == 0 || max_visible_lines == 0 {
        return Vec::new();
    }

    let mut rows = wrap_transcript(transcript, max_chars_per_line);
    if rows.len() > max_visible_lines {
        rows.drain(..rows.len() - max_visible_lines);
    }
    rows
}

/// A row positioned on screen, ready for the host to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLine {
    pub x: u32,
    pub y: u32,
    pub text: String,
}

/// Everything the host needs to render one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub viewport: Viewport,
    pub lines: Vec<PlacedLine>,
}

impl Frame {
    /// The visible rows without positions.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Place rows top to bottom, indented by `indent_cols` glyphs.
pub fn layout_frame(
    rows: Vec<String>,
    viewport: Viewport,
    glyph: GlyphCell,
    indent_cols: u32,
    top_px: u32,
) -> Frame {
    let x = glyph.width.saturating_mul(indent_cols);
    let lines = rows
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlacedLine {
            x,
            y: top_px.saturating_add(glyph.height.saturating_mul(i as u32)),
            text,
        })
        .collect();
    Frame { viewport, lines }
}
