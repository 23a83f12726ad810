//! CSV and ZIP writers for generated rosters.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::models::RosterRow;

const FILE_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year][month][day]");

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Files written by [`write_roster`].
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub csv: PathBuf,
    pub zip: Option<PathBuf>,
}

/// Writes rows as CSV. The header row is written even when `rows` is empty.
pub fn write_csv<W: Write>(rows: &[RosterRow], writer: W) -> Result<(), OutputError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(RosterRow::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// `{prefix}-{YYYYMMDD}.{extension}`
pub fn dated_path(prefix: &Path, date: Date, extension: &str) -> PathBuf {
    let stamp = date.format(FILE_DATE).unwrap_or_default();
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("-{stamp}.{extension}"));
    PathBuf::from(name)
}

/// Writes the roster CSV, plus a ZIP containing it when `with_zip` is set.
pub fn write_roster(
    rows: &[RosterRow],
    prefix: &Path,
    date: Date,
    with_zip: bool,
) -> Result<OutputFiles, OutputError> {
    let csv_path = dated_path(prefix, date, "csv");
    write_csv(rows, File::create(&csv_path)?)?;
    tracing::debug!("Wrote {} rows to {}", rows.len(), csv_path.display());

    let zip_path = if with_zip {
        let zip_path = dated_path(prefix, date, "zip");
        zip_file(&csv_path, &zip_path)?;
        Some(zip_path)
    } else {
        None
    };

    Ok(OutputFiles {
        csv: csv_path,
        zip: zip_path,
    })
}

fn zip_file(source: &Path, archive_path: &Path) -> Result<(), OutputError> {
    let entry_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("members.csv");
    let contents = std::fs::read(source)?;

    let mut archive = ZipWriter::new(File::create(archive_path)?);
    archive.start_file(entry_name, SimpleFileOptions::default())?;
    archive.write_all(&contents)?;
    archive.finish()?;
    Ok(())
}
