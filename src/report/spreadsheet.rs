use std::io::Write;

use crate::analysis::ReportResult;
use crate::error::Error;

/// Two-column listing: description and source table index.
pub fn write_csv<W: Write>(result: &ReportResult, writer: W) -> Result<W, Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Descrição", "Tabela"])?;
    for record in &result.extractions {
        let index = record.source_table_index.to_string();
        wtr.write_record([record.description.as_str(), index.as_str()])?;
    }
    wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
}

pub fn to_csv(result: &ReportResult) -> Result<Vec<u8>, Error> {
    write_csv(result, Vec::new())
}
