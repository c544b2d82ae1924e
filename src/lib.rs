pub mod analysis;
mod docx;
mod error;
mod fonts;
pub mod model;
pub mod report;

pub use analysis::{
    AnalysisOptions, AnnotationColor, CountTotals, ExtractionRecord, ReportResult, analyze,
};
pub use error::Error;
pub use report::ChartImage;

use std::path::Path;
use std::time::Instant;

use model::Document;

pub fn parse_docx(input: &Path) -> Result<Document, Error> {
    docx::parse(input)
}

pub fn parse_docx_bytes(input: &[u8]) -> Result<Document, Error> {
    docx::parse_bytes(input)
}

pub fn analyze_docx(input: &Path, options: &AnalysisOptions) -> Result<ReportResult, Error> {
    let t0 = Instant::now();

    let doc = docx::parse(input)?;
    let t_parse = t0.elapsed();

    let result = analyze(&doc, options);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, analyze={:.1}ms, total={:.1}ms ({} tables, {} descriptions)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        doc.tables.len(),
        result.extractions.len(),
    );

    Ok(result)
}

pub fn analyze_docx_bytes(input: &[u8], options: &AnalysisOptions) -> Result<ReportResult, Error> {
    let t0 = Instant::now();

    let doc = docx::parse_bytes(input)?;
    let t_parse = t0.elapsed();

    let result = analyze(&doc, options);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, analyze={:.1}ms, total={:.1}ms ({} tables, {} descriptions)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        doc.tables.len(),
        result.extractions.len(),
    );

    Ok(result)
}
