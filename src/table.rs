//! CSV encoding of company listings.

use std::io::Read;

use crate::extractor::CompanyRecord;

pub const HEADER: [&str; 2] = ["Company", "URL"];

/// Renders the header row followed by one row per record, in order.
pub fn write_csv(records: &[CompanyRecord]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(64 * (records.len() + 1)));

    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record([record.name.as_str(), record.url.as_str()])?;
    }

    let bytes = writer.into_inner().map_err(|err| {
        csv::Error::from(std::io::Error::new(err.error().kind(), err.error().to_string()))
    })?;
    // every field came in as a String, so the output is valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads `Company,URL` rows produced by an out-of-process extractor.
///
/// The first row must be the `Company,URL` header. Empty input reads as no
/// records. Fields are returned exactly as written.
pub fn read_csv<R: Read>(input: R) -> Result<Vec<CompanyRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);

    let header = reader.headers()?;
    if header.is_empty() {
        return Ok(Vec::new());
    }
    if header.len() != HEADER.len() || header.iter().map(str::trim).ne(HEADER) {
        return Err(invalid_data(format!(
            "expected header {:?}, found {:?}",
            HEADER,
            header.iter().collect::<Vec<_>>()
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() != 2 {
            return Err(invalid_data(format!("expected 2 fields, found {}", row.len())));
        }
        records.push(CompanyRecord::new(&row[0], &row[1]));
    }

    Ok(records)
}

fn invalid_data(message: String) -> csv::Error {
    csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}
