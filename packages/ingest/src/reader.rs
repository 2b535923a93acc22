//! Yearly trip extract reading.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use bikeshare_trip_models::{RawTable, RawValue};

use crate::IngestError;
use crate::profile::CityProfile;
use crate::progress::LoadProgress;

/// Reads a semicolon-separated trip extract.
///
/// Header names are trimmed. Every non-empty cell is kept as raw text,
/// padding and decimal commas included; rows may be shorter or longer than
/// the header. Cells that are not valid UTF-8 are decoded as Latin-1.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the input is not valid CSV.
pub fn read_trip_csv<R: Read>(reader: R) -> Result<RawTable, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(reader);

    let mut table = RawTable::new(rdr.byte_headers()?.iter().map(decode_cell));
    for record in rdr.byte_records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|cell| RawValue::from(decode_cell(cell)))
                .collect(),
        );
    }

    Ok(table)
}

fn decode_cell(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            let text: String = bytes.iter().copied().map(char::from).collect();
            log::warn!("Cell {text:?} is not valid UTF-8, decoded as Latin-1");
            text
        }
    }
}

/// Reads one yearly extract from disk.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be opened and
/// [`IngestError::Csv`] if it cannot be parsed.
pub fn read_year_file(path: &Path) -> Result<RawTable, IngestError> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_trip_csv(std::io::BufReader::new(file))?;
    log::debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Reads and concatenates the extracts for `start_year..=end_year`.
///
/// The combined header is the union of all file headers in first-seen order.
/// Columns missing from a file are empty in its rows.
///
/// # Errors
///
/// Returns [`IngestError::InvalidYearRange`] if `start_year > end_year`, or
/// any error from [`read_year_file`].
pub fn load_years(
    profile: &CityProfile,
    data_dir: &Path,
    start_year: i32,
    end_year: i32,
    progress: &Arc<dyn LoadProgress>,
) -> Result<RawTable, IngestError> {
    if start_year > end_year {
        return Err(IngestError::InvalidYearRange {
            start_year,
            end_year,
        });
    }

    progress.start(u64::from(start_year.abs_diff(end_year)) + 1);

    let mut tables = Vec::new();
    for year in start_year..=end_year {
        let path = profile.trip_file(data_dir, year);
        progress.reading(year, &path);
        let table = read_year_file(&path)?;
        progress.file_read(table.len());
        tables.push(table);
    }

    let table = RawTable::concat(tables);
    progress.finish(table.len());
    log::info!(
        "Loaded {} raw trips for {}-{} ({})",
        table.len(),
        start_year,
        end_year,
        profile.name
    );

    Ok(table)
}
