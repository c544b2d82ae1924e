//! Artifacts derived from a [`ReportResult`](crate::analysis::ReportResult):
//! a text summary, a regenerated DOCX, a PDF summary, a CSV listing and JSON.
//!
//! The proportion chart itself is drawn elsewhere; writers only embed a PNG
//! handed to them as a [`ChartImage`].

pub mod docx;
pub mod pdf;
mod spreadsheet;
mod summary;

use std::io::Cursor;
use std::path::Path;

use crate::analysis::ReportResult;
use crate::error::Error;

pub use spreadsheet::{to_csv, write_csv};
pub use summary::{
    CONFORME_COLOR, CONFORME_LABEL, NAO_CONFORME_COLOR, NAO_CONFORME_LABEL, Proportion,
    proportions, summary_text,
};

/// A chart rendered by the caller, as PNG.
#[derive(Clone, Debug)]
pub struct ChartImage {
    pub data: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl ChartImage {
    pub fn from_png(data: Vec<u8>) -> Result<Self, Error> {
        let reader = image::ImageReader::with_format(Cursor::new(&data), image::ImageFormat::Png);
        let (pixel_width, pixel_height) = reader.into_dimensions()?;
        if pixel_width == 0 || pixel_height == 0 {
            return Err(Error::InvalidChart("image has no pixels".into()));
        }
        Ok(Self {
            data,
            pixel_width,
            pixel_height,
        })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_png(std::fs::read(path)?)
    }

    /// Height for a given display width, keeping the aspect ratio.
    pub fn scaled_height(&self, width: f32) -> f32 {
        width * self.pixel_height as f32 / self.pixel_width as f32
    }
}

pub fn to_json(result: &ReportResult, pretty: bool) -> Result<String, Error> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
