pub mod analysis;
pub mod boxfile;
pub mod consts;
pub mod convert;
pub mod error;
pub mod glyph;

// Re-export commonly used types
pub use analysis::{bbox::Bbox, labels::Label};
pub use convert::{
    BatchConverter, ConverterConfig, ConverterConfigBuilder, MalformedPolicy, RunSummary,
};
pub use error::GlyphError;
