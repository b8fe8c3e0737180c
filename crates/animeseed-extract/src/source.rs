//! Streaming access to the source CSV files.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use crate::errors::ExtractError;

/// One CSV row with its columns addressable by header name.
pub struct Row<'a> {
    record: &'a StringRecord,
    columns: &'a HashMap<String, usize>,
    index: u64,
}

impl<'a> Row<'a> {
    /// Raw cell for `column`, empty when the column or cell is absent.
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|position| self.record.get(*position))
            .unwrap_or("")
    }

    /// 1-based data row index (the header is not counted).
    pub fn index(&self) -> u64 {
        self.index
    }
}

/// A source CSV opened for a single streaming pass.
pub struct CsvSource {
    path: PathBuf,
    reader: csv::Reader<File>,
    columns: HashMap<String, usize>,
    progress: ProgressBar,
}

impl std::fmt::Debug for CsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSource")
            .field("path", &self.path)
            .field("columns", &self.columns.len())
            .finish()
    }
}

impl CsvSource {
    /// Open `path` and check that every `required` column is present.
    pub fn open(path: &Path, required: &[&str], progress: bool) -> Result<Self, ExtractError> {
        let file = File::open(path).map_err(|err| ExtractError::file(path, err))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let columns: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(position, name)| (name.trim().to_string(), position))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|column| !columns.contains_key(**column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ExtractError::MissingColumns {
                path: path.to_path_buf(),
                missing,
            });
        }

        let progress = if progress {
            progress_bar(path, count_data_rows(path)?)
        } else {
            ProgressBar::hidden()
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            columns,
            progress,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Visit every data row once. Returns the number of rows read.
    pub fn for_each_row<F>(mut self, mut visit: F) -> Result<u64, ExtractError>
    where
        F: FnMut(&Row<'_>) -> Result<(), ExtractError>,
    {
        let mut record = StringRecord::new();
        let mut index = 0_u64;

        while self.reader.read_record(&mut record)? {
            index += 1;
            let row = Row {
                record: &record,
                columns: &self.columns,
                index,
            };
            visit(&row)?;
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        debug!(path = %self.path.display(), rows = index, "source scanned");
        Ok(index)
    }
}

/// Data rows in `path`, counted by newlines. Only used to size progress bars.
pub fn count_data_rows(path: &Path) -> Result<u64, ExtractError> {
    let file = File::open(path).map_err(|err| ExtractError::file(path, err))?;
    let mut reader = BufReader::new(file);
    let mut lines = 0_u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| ExtractError::file(path, err))?;
        if read == 0 {
            break;
        }
        lines += 1;
    }
    Ok(lines.saturating_sub(1))
}

fn progress_bar(path: &Path, total: u64) -> ProgressBar {
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr_with_hz(12));
    bar.set_style(
        ProgressStyle::with_template(
            "  {msg:<28} {bar:40.cyan/blue} {pos}/{len} rows [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );
    bar.set_message(label);
    bar
}
