/// Size of one monospace glyph cell in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    pub width: u32,
    pub height: u32,
}

impl GlyphCell {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Columns and rows reserved for chrome (top panel, prompt indentation).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Margins {
    pub cols: u32,
    pub rows: u32,
}

impl Margins {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(6, 10)
    }
}

/// Character grid the display can show this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Maximum characters per row.
    pub cols: usize,
    /// Maximum visible rows.
    pub rows: usize,
}

impl Viewport {
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Derive the grid from the screen's pixel size.
    ///
    /// Both dimensions saturate at zero, so a screen smaller than the margins
    /// (or a zero-sized glyph) gives an empty viewport instead of an error.
    pub fn from_screen(width_px: u32, height_px: u32, glyph: GlyphCell, margins: Margins) -> Self {
        let cols = width_px
            .checked_div(glyph.width)
            .unwrap_or(0)
            .saturating_sub(margins.cols);
        let rows = height_px
            .checked_div(glyph.height)
            .unwrap_or(0)
            .saturating_sub(margins.rows);
        Self {
            cols: cols as usize,
            rows: rows as usize,
        }
    }

    /// True when nothing can be drawn.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}
