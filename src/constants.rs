//! Shared crate-wide constants.

use crate::geometry::Padding;

/// Number of caret probes taken around the pointer before giving up on
/// finding text: the pointer itself plus one ring of four compass points.
pub const SAMPLE_COUNT: usize = 5;

/// Distance, in virtual pixels, between the pointer and each probe ring.
pub const SAMPLE_RADIUS: f64 = 4.0;

/// How many ancestors the row locator inspects when looking for a block box.
pub const ANCESTOR_LEVELS: usize = 3;

/// Space added around a located row before it is rendered.
pub const RULER_PADDING: Padding = Padding::new(4.0, 2.0);

pub const DEFAULT_OPACITY: f64 = 0.2;

/// Tag carried by every cross-context message this crate produces.
pub const MESSAGE_GUARD: &str = "reading-ruler";

/// Prefix for the ids of overlay elements placed on a render surface.
pub const ELEMENT_PREFIX: &str = "--reading-ruler-";

/// Virtual pixel size of one terminal cell.
///
/// The core geometry works in pixels the way a browser viewport does; the
/// terminal host maps each cell to this many pixels and rounds back to cells
/// only when painting.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Embedded frames whose content viewport is this small (in either
/// dimension) are treated as tracking pixels and get no ruler.
pub const MIN_FRAME_VIEWPORT_PX: f64 = 100.0;

/// Total height of an embedded frame box, in rows, including its border.
pub const FRAME_ROWS: u16 = 12;

/// Height of an image placeholder box, in rows.
pub const IMAGE_ROWS: u16 = 3;

/// Indentation, in columns, applied to block quotes and list items.
pub const BLOCK_INDENT_COLS: u16 = 2;
