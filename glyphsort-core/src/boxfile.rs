use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, ensure};
use tracing::*;

use crate::{analysis::bbox::Bbox, consts::BOX_RECORD_FIELDS, error::*};

/// One row of a box file.
///
/// Coordinates are in the box file convention: origin at the bottom-left
/// corner of the page, y growing upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxRecord {
    /// Raw character token as written by the OCR tool.
    pub character: String,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// 1-based line number in the box file.
    pub line: usize,
}

impl BoxRecord {
    /// Parses a single space-delimited row.
    ///
    /// Fields past the fifth (Tesseract appends a page index) are ignored.
    pub fn parse(row: &str, path: &str, line: usize) -> Result<Self, GlyphError> {
        let fields = row.split(' ').collect::<Vec<_>>();

        ensure!(
            fields.len() >= BOX_RECORD_FIELDS,
            MalformedRecordSnafu {
                path,
                line,
                message: format!(
                    "expected {} fields, found {}",
                    BOX_RECORD_FIELDS,
                    fields.len()
                ),
            }
        );
        ensure!(
            !fields[0].is_empty(),
            MalformedRecordSnafu {
                path,
                line,
                message: "empty character field",
            }
        );

        let coordinate = |field: &'static str, value: &str| {
            value
                .parse::<i32>()
                .context(InvalidCoordinateSnafu { path, line, field })
        };

        Ok(Self {
            character: fields[0].to_string(),
            x1: coordinate("x1", fields[1])?,
            y1: coordinate("y1", fields[2])?,
            x2: coordinate("x2", fields[3])?,
            y2: coordinate("y2", fields[4])?,
            line,
        })
    }

    /// Image-space rectangle of the record on a page `image_height` pixels tall.
    ///
    /// A row whose converted y coordinates leave the `i32` range is reported as
    /// [`GlyphError::MalformedRecord`].
    pub fn bbox(&self, path: &str, image_height: i32) -> Result<Bbox, GlyphError> {
        Bbox::from_box_coords(self.x1, self.y1, self.x2, self.y2, image_height).context(
            MalformedRecordSnafu {
                path,
                line: self.line,
                message: format!("coordinates overflow on a page {image_height} pixels tall"),
            },
        )
    }
}

/// A decoded box file.
#[derive(Debug, Clone)]
pub struct BoxFile {
    pub path: PathBuf,
    content: String,
}

impl BoxFile {
    /// Reads a box file and decodes it as UTF-8.
    ///
    /// A leading byte order mark is dropped; any other invalid byte sequence
    /// fails the whole file.
    pub fn open(path: &Path) -> Result<Self, GlyphError> {
        let path_str = path.display().to_string();
        let bytes = std::fs::read(path).context(IoReadSnafu { path: &path_str })?;
        let mut content =
            String::from_utf8(bytes).context(BoxFileEncodingSnafu { path: &path_str })?;

        if content.starts_with('\u{feff}') {
            content.replace_range(..'\u{feff}'.len_utf8(), "");
        }

        debug!("read box file {} ({} bytes)", path_str, content.len());

        Ok(Self::from_content(path, content))
    }

    pub fn from_content(path: &Path, content: String) -> Self {
        Self {
            path: path.to_path_buf(),
            content,
        }
    }

    /// Parses the rows lazily, skipping blank lines.
    pub fn records(&self) -> impl Iterator<Item = Result<BoxRecord, GlyphError>> + '_ {
        let path = self.path.display().to_string();

        self.content
            .lines()
            .enumerate()
            .filter(|(_, row)| !row.trim().is_empty())
            .map(move |(idx, row)| BoxRecord::parse(row, &path, idx + 1))
    }
}

/// Path of the box file that belongs to `image`.
///
/// Fails with [`GlyphError::MissingCompanion`] when no such file exists.
pub fn locate_companion(image: &Path, extension: &str) -> Result<PathBuf, GlyphError> {
    let boxfile = image.with_extension(extension);

    ensure!(
        boxfile.is_file(),
        MissingCompanionSnafu {
            image: image.display().to_string(),
            boxfile: boxfile.display().to_string(),
        }
    );

    Ok(boxfile)
}
