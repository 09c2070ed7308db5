use snafu::prelude::*;

use crate::analysis::bbox::Bbox;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GlyphError {
    #[snafu(display("No box file `{}` found for page image `{}`", boxfile, image))]
    MissingCompanion { image: String, boxfile: String },
    #[snafu(display("Malformed record at `{}` line {}: {}", path, line, message))]
    MalformedRecord {
        path: String,
        line: usize,
        message: String,
    },
    #[snafu(display(
        "Invalid `{}` coordinate at `{}` line {}: {}",
        field,
        path,
        line,
        source
    ))]
    InvalidCoordinate {
        source: std::num::ParseIntError,
        path: String,
        line: usize,
        field: &'static str,
    },
    #[snafu(display("Box file `{}` is not valid UTF-8: {}", path, source))]
    BoxFileEncoding {
        source: std::string::FromUtf8Error,
        path: String,
    },
    #[snafu(display("Image Open `{}` error: {}", path, source))]
    ImageOpen {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Image Write `{}` error: {}", path, source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display(
        "Crop {:?} does not fit page `{}` of size {}x{}",
        bbox,
        path,
        width,
        height
    ))]
    InvalidCrop {
        bbox: Bbox,
        path: String,
        width: u32,
        height: u32,
    },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Create directory `{}` error: {}", path, source))]
    CreateDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write report `{}` error: {}", path, source))]
    ReportWrite {
        source: serde_json::Error,
        path: String,
    },
}

impl GlyphError {
    /// Record-level failures that the skip policy may step over.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            GlyphError::MalformedRecord { .. } | GlyphError::InvalidCoordinate { .. }
        )
    }
}
