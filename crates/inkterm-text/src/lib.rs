//! inkterm-text: transcript layout for a fixed character grid.
//!
//! Turns the growing transcript into the rows that fit the screen. Everything
//! here is pure: the same transcript and viewport always give the same rows.
//!
//! # Architecture
//!
//! - [`Viewport`]: Grid size derived from pixel size, glyph cell and margins.
//! - [`wrap_line`] / [`wrap_transcript`]: Hard character wrap, counted by `char`.
//! - [`paginate`]: Wrap then keep the tail window that fits.
//! - [`layout_frame`]: Pixel placement of the visible rows.

pub mod page;
pub mod viewport;
pub mod wrap;

pub use page::{layout_frame, paginate, Frame, PlacedLine};
pub use viewport::{GlyphCell, Margins, Viewport};
pub use wrap::{wrap_line, wrap_transcript};
