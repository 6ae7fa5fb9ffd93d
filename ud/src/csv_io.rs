//! CSV loading and persistence
//!
//! Empty cells and the usual NA spellings (`NA`, `N/A`, `null`, `None`,
//! `nan`, ...) are read as missing values. Columns beyond the required ones
//! are carried through untouched; an input column named like a derived output
//! column is carried too and overwritten with the derived value on save.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::table::{DERIVED_COLUMNS, ProvisionedAccount, REQUIRED_COLUMNS, RawRecord, RecordTable, Table};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Cell values read as missing
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Load a table from a CSV file
pub fn load(path: &Path) -> Result<RecordTable, PipelineError> {
    debug!(?path, "load: called");
    let data = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(strip_utf8_bom(&data), path)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.field_count(),
        "Read csv file"
    );
    Ok(table)
}

/// Parse a table from any CSV reader; `source` is only used in error messages
pub fn read_table<R: Read>(input: R, source: &Path) -> Result<RecordTable, PipelineError> {
    let csv_err = |e: csv::Error| PipelineError::Csv {
        path: source.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader.headers().map_err(csv_err)?.iter().map(String::from).collect();
    debug!(?headers, "read_table: headers");

    let mut required_idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in required_idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;
    }

    let mut columns = Vec::new();
    let mut extra_idx = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if DERIVED_COLUMNS.contains(&header.as_str()) {
            warn!(column = %header, "Input column will be overwritten with derived values");
        }
        match REQUIRED_COLUMNS.iter().position(|c| c == header) {
            Some(pos) if required_idx[pos] == idx => columns.push(header.clone()),
            Some(_) => warn!(column = %header, "Dropping repeated input column"),
            None => {
                columns.push(header.clone());
                extra_idx.push(idx);
            }
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let cell = |idx: usize| row.get(idx).filter(|v| !NA_VALUES.contains(v)).map(String::from);
        let [email, main, backup, first, last, dept] = required_idx;
        records.push(RawRecord {
            login_email: cell(email),
            main_password: cell(main),
            backup_password: cell(backup),
            first_name: cell(first),
            last_name: cell(last),
            department: cell(dept),
            extras: extra_idx.iter().map(|&idx| cell(idx)).collect(),
        });
    }

    Ok(Table::new(columns, records))
}

/// Write the finished table to a CSV file
pub fn save(path: &Path, table: &Table<ProvisionedAccount>) -> Result<(), PipelineError> {
    debug!(?path, rows = table.len(), "save: called");
    let file = fs::File::create(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(file, table).map_err(|source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = table.len(), "Saved validated data");
    Ok(())
}

/// Serialize the finished table as CSV
pub fn write_table<W: Write>(output: W, table: &Table<ProvisionedAccount>) -> Result<(), csv::Error> {
    let columns = table.output_columns();
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(&columns)?;
    for record in &table.records {
        writer.write_record(record.values(&table.columns))?;
    }
    writer.flush()?;
    Ok(())
}
