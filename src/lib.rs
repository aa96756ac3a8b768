//! Renders the web-application development estimate (견적서) for the 참신한 게시대 project to PDF.
//!
//! [`estimate::build_estimate`] assembles the fixed content into a [`model::Document`],
//! [`builder::PdfBuilder`] lays it out with `genpdf`, and [`output::build_and_save`] ties both
//! together and writes the file.

pub mod builder;
pub mod elements;
pub mod error;
pub mod estimate;
pub mod fonts;
pub mod model;
pub mod output;
pub mod richtext;
pub mod shading;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use error::{EstimateError, Result};
pub use output::{build_and_save, GenerationOptions, GenerationReport};
pub use shading::set_cell_shading;
