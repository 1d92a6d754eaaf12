//! CSV export of staff lists
//!
//! Employees and mentors implement [`CsvRecord`]; [`to_csv`] renders a header
//! row followed by one line per record.

/// Failure while rendering CSV
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush csv writer: {0}")]
    Flush(String),

    #[error("csv output is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A row type that can be exported
pub trait CsvRecord {
    /// Header row, in the same order as [`CsvRecord::fields`]
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

/// Renders records as CSV text, header first.
pub fn to_csv<T: CsvRecord>(records: &[T]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(T::HEADERS)?;
    for record in records {
        writer.write_record(record.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;

    Ok(String::from_utf8(bytes)?)
}

/// `Content-Disposition` value for a download named `<stem>.csv`
pub fn attachment_header(stem: &str) -> String {
    format!("attachment; filename=\"{stem}.csv\"")
}
