/// Extension of the page images scanned in the source directory.
pub const IMAGE_EXTENSION: &str = "tif";

/// Extension of the companion box file sharing the page image's stem.
pub const BOX_EXTENSION: &str = "box";

/// Extension of every glyph written to the destination.
pub const GLYPH_EXTENSION: &str = "jpg";

/// Horizontal and vertical density written into each glyph's JFIF header.
///
/// Glyphs are cut from 600 DPI scans, so the crops keep the same physical
/// scale when opened in an image editor.
pub const GLYPH_DPI: u16 = 600;

/// JPEG quality used when encoding glyphs.
pub const JPEG_QUALITY: u8 = 75;

/// Number of trailing characters of the page image stem used as page number.
pub const PAGE_NUMBER_WIDTH: usize = 3;

/// Minimum number of space-delimited fields in a box file row:
/// character, x1, y1, x2, y2.
pub const BOX_RECORD_FIELDS: usize = 5;
