use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{
    ColorType, DynamicImage,
    codecs::jpeg::{JpegEncoder, PixelDensity},
};
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    analysis::{bbox::Bbox, labels::Label},
    consts::*,
    error::*,
};

/// Page number of a page image: the last characters of its file stem.
///
/// Stems shorter than [`PAGE_NUMBER_WIDTH`] are used whole.
pub fn page_number(stem: &str) -> String {
    let count = stem.chars().count();
    stem.chars()
        .skip(count.saturating_sub(PAGE_NUMBER_WIDTH))
        .collect()
}

/// Output file name of a glyph: `<label>-<page>-<x1>-<y2>-<x2>-<y1>.jpg`.
///
/// Only depends on its inputs, so an identical row always lands on the same
/// file and overwrites it.
pub fn glyph_file_name(label: &Label, page: &str, bbox: &Bbox) -> String {
    format!(
        "{}-{}-{}-{}-{}-{}.{}",
        label,
        page,
        bbox.left(),
        bbox.top(),
        bbox.right(),
        bbox.bottom(),
        GLYPH_EXTENSION
    )
}

/// Folder collecting every glyph of `label`, created on demand.
pub fn ensure_label_dir(destination: &Path, label: &Label) -> Result<PathBuf, GlyphError> {
    let dir = destination.join(label.name());

    if !dir.is_dir() {
        info!("creating folder {}", dir.display());
        std::fs::create_dir_all(&dir).context(CreateDirSnafu {
            path: dir.display().to_string(),
        })?;
    }

    Ok(dir)
}

/// Cuts `bbox` out of a page image.
///
/// The rectangle must be non-empty and lie inside the page; it is never
/// clamped.
pub fn crop(
    page: &DynamicImage,
    bbox: &Bbox,
    page_path: &Path,
) -> Result<DynamicImage, GlyphError> {
    let (x, y, width, height) = bbox
        .crop_rect(page.width(), page.height())
        .context(InvalidCropSnafu {
            bbox: *bbox,
            path: page_path.display().to_string(),
            width: page.width(),
            height: page.height(),
        })?;

    Ok(page.crop_imm(x, y, width, height))
}

/// Writes a glyph as baseline JPEG tagged with `dpi` dots per inch.
///
/// Grayscale pages stay single channel; everything else is flattened to RGB
/// since JPEG carries no alpha.
pub fn save_jpeg(
    glyph: &DynamicImage,
    path: &Path,
    dpi: u16,
    quality: u8,
) -> Result<(), GlyphError> {
    let path_str = path.display().to_string();
    let file = File::create(path).context(IoWriteSnafu { path: &path_str })?;
    let mut writer = BufWriter::new(file);

    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    encoder.set_pixel_density(PixelDensity::dpi(dpi));

    let encoded = match glyph.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            encoder.encode_image(&glyph.to_luma8())
        }
        _ => encoder.encode_image(&glyph.to_rgb8()),
    };
    encoded.context(ImageWriteSnafu { path: &path_str })?;

    writer.flush().context(IoWriteSnafu { path: &path_str })?;

    Ok(())
}
