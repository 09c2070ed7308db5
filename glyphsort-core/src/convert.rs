use std::{
    collections::BTreeMap,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    time::Instant,
};

use clap::ValueEnum;
use derive_builder::Builder;
use image::DynamicImage;
use serde::Serialize;
use snafu::ResultExt;
use tracing::*;

use crate::{
    analysis::{bbox::Bbox, labels::Label},
    boxfile::{BoxFile, BoxRecord, locate_companion},
    consts::*,
    error::*,
    glyph::{crop, ensure_label_dir, glyph_file_name, page_number, save_jpeg},
};

/// What to do with a box file row that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop the whole run at the first bad row.
    #[default]
    Abort,
    /// Log the row, count it and continue with the next one.
    Skip,
}

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ConverterConfig {
    /// Folder scanned for page images (direct children only).
    pub source: PathBuf,
    /// Root of the per-label glyph folders.
    pub destination: PathBuf,
    #[builder(default = "IMAGE_EXTENSION.to_string()")]
    pub image_extension: String,
    #[builder(default = "BOX_EXTENSION.to_string()")]
    pub box_extension: String,
    #[builder(default = "GLYPH_DPI")]
    pub dpi: u16,
    #[builder(default = "JPEG_QUALITY")]
    pub quality: u8,
    #[builder(default)]
    pub on_malformed: MalformedPolicy,
}

/// One glyph written during a run.
#[derive(Debug, Clone, Serialize)]
pub struct GlyphEntry {
    pub label: Label,
    pub page: String,
    pub line: usize,
    pub bbox: Bbox,
    pub path: PathBuf,
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    /// Glyphs written.
    pub glyphs: usize,
    /// Page images that had a box file.
    pub pages: usize,
    /// Page images skipped for lack of a box file.
    pub skipped_pages: Vec<PathBuf>,
    /// Rows stepped over under [`MalformedPolicy::Skip`].
    pub skipped_records: usize,
    pub labels: BTreeMap<Label, usize>,
    pub entries: Vec<GlyphEntry>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    fn push(&mut self, entry: GlyphEntry) {
        self.glyphs += 1;
        *self.labels.entry(entry.label.clone()).or_default() += 1;
        self.entries.push(entry);
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Isolated {} characters. Elapsed time: {} seconds.",
            self.glyphs, self.elapsed_secs
        )
    }

    /// Writes the summary as pretty printed JSON.
    pub fn write_report(&self, path: &Path) -> Result<(), GlyphError> {
        let path_str = path.display().to_string();
        let file = File::create(path).context(IoWriteSnafu { path: &path_str })?;

        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context(ReportWriteSnafu { path: &path_str })
    }
}

/// Turns a folder of page image / box file pairs into per-label glyph folders.
pub struct BatchConverter {
    config: ConverterConfig,
}

impl BatchConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Page images in the source folder, in path order.
    pub fn page_images(&self) -> Result<Vec<PathBuf>, GlyphError> {
        let source = &self.config.source;
        let read_err = || IoReadSnafu {
            path: source.display().to_string(),
        };

        let mut pages = Vec::new();
        for entry in std::fs::read_dir(source).context(read_err())? {
            let path = entry.context(read_err())?.path();
            let matches_ext = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.config.image_extension);

            if matches_ext && path.is_file() {
                pages.push(path);
            }
        }
        pages.sort();

        Ok(pages)
    }

    /// Processes every page image of the source folder.
    ///
    /// Pages without a box file are skipped. Image, file system and (under
    /// [`MalformedPolicy::Abort`]) record errors stop the run.
    #[tracing::instrument(skip_all, fields(source = %self.config.source.display()))]
    pub fn run(&self) -> Result<RunSummary, GlyphError> {
        let start = Instant::now();
        let mut summary = RunSummary::default();

        let destination = &self.config.destination;
        if !destination.is_dir() {
            info!("creating destination {}", destination.display());
            std::fs::create_dir_all(destination).context(CreateDirSnafu {
                path: destination.display().to_string(),
            })?;
        }

        info!(
            "working on {} files in {}",
            self.config.image_extension,
            self.config.source.display()
        );

        for image_path in self.page_images()? {
            info!("found page image {}", image_path.display());

            match locate_companion(&image_path, &self.config.box_extension) {
                Ok(boxfile) => self.convert_page(&image_path, &boxfile, &mut summary)?,
                Err(err @ GlyphError::MissingCompanion { .. }) => {
                    info!("skipping page: {}", err);
                    summary.skipped_pages.push(image_path);
                }
                Err(err) => return Err(err),
            }
        }

        summary.elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            "converted {} pages into {} glyphs in {}ms",
            summary.pages,
            summary.glyphs,
            start.elapsed().as_millis()
        );

        Ok(summary)
    }

    /// Crops every record of one box file out of its page image.
    ///
    /// The page image and the box file are dropped before returning.
    pub fn convert_page(
        &self,
        image_path: &Path,
        boxfile_path: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), GlyphError> {
        info!("opening {}", boxfile_path.display());
        let boxfile = BoxFile::open(boxfile_path)?;

        let page = image::open(image_path).context(ImageOpenSnafu {
            path: image_path.display().to_string(),
        })?;
        let stem = image_path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        let page_no = page_number(&stem);

        let height = i32::try_from(page.height()).unwrap_or(i32::MAX);
        let boxfile_str = boxfile.path.display().to_string();

        for record in boxfile.records() {
            let written = record.and_then(|record| {
                info!("reading row {}", record.line);
                let bbox = record.bbox(&boxfile_str, height)?;
                self.write_glyph(&page, image_path, &page_no, &record, bbox)
            });

            match written {
                Ok(entry) => summary.push(entry),
                Err(err)
                    if err.is_record_error()
                        && self.config.on_malformed == MalformedPolicy::Skip =>
                {
                    warn!("skipping row: {}", err);
                    summary.skipped_records += 1;
                }
                Err(err) => return Err(err),
            }
        }

        summary.pages += 1;
        Ok(())
    }

    /// Classifies, crops and saves the glyph of a single record.
    ///
    /// The crop is validated before the label folder is created, so a rejected
    /// rectangle leaves nothing behind.
    pub fn write_glyph(
        &self,
        page: &DynamicImage,
        image_path: &Path,
        page_no: &str,
        record: &BoxRecord,
        bbox: Bbox,
    ) -> Result<GlyphEntry, GlyphError> {
        let label = Label::from_token(&record.character);

        let glyph = crop(page, &bbox, image_path)?;
        let dir = ensure_label_dir(&self.config.destination, &label)?;
        let path = dir.join(glyph_file_name(&label, page_no, &bbox));

        save_jpeg(&glyph, &path, self.config.dpi, self.config.quality)?;
        info!("writing {}", path.display());

        Ok(GlyphEntry {
            label,
            page: page_no.to_string(),
            line: record.line,
            bbox,
            path,
        })
    }
}
