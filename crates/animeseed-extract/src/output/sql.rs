use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use animeseed_core::TableSpec;

use crate::errors::ExtractError;
use crate::model::TableReport;
use crate::records::SeedRow;

/// A rendered seed script, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub table: String,
    pub file: String,
    pub rows: u64,
    pub sql: String,
}

/// Render `rows` as one conflict-safe INSERT, sorted by natural key.
pub fn render_table<'a, R, I>(
    spec: &TableSpec,
    rows: I,
    generated_by: &str,
) -> Result<RenderedTable, ExtractError>
where
    R: SeedRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut sorted: Vec<&R> = rows.into_iter().collect();
    sorted.sort_by_key(|row| row.key());

    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].key() == pair[1].key()) {
        return Err(ExtractError::InvalidRow {
            table: spec.name.clone(),
            message: format!("duplicate natural key {:?}", pair[0].key()),
        });
    }

    let mut lines = vec![
        format!("-- Seed data for table: {}", spec.name),
        format!("-- Generated by {generated_by}"),
        String::new(),
    ];

    if sorted.is_empty() {
        lines.push(format!("-- No rows generated for {}.", spec.name));
    } else {
        let mut tuples = Vec::with_capacity(sorted.len());
        for row in &sorted {
            let values = row.values();
            if values.len() != spec.columns.len() {
                return Err(ExtractError::InvalidRow {
                    table: spec.name.clone(),
                    message: format!(
                        "expected {} values, got {}",
                        spec.columns.len(),
                        values.len()
                    ),
                });
            }
            let rendered: Vec<String> = values.iter().map(|value| value.render()).collect();
            tuples.push(format!("    ({})", rendered.join(", ")));
        }

        lines.push(format!(
            "INSERT INTO {} ({}) VALUES",
            spec.name,
            spec.columns.join(", ")
        ));
        lines.push(tuples.join(",\n"));
        lines.push(spec.conflict_clause());
    }
    lines.push(String::new());

    Ok(RenderedTable {
        table: spec.name.clone(),
        file: spec.file_name(),
        rows: sorted.len() as u64,
        sql: lines.join("\n"),
    })
}

/// A table written to its temp file, waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedTable {
    tmp_path: PathBuf,
    path: PathBuf,
    report: TableReport,
}

impl StagedTable {
    pub fn commit(self) -> Result<TableReport, ExtractError> {
        std::fs::rename(&self.tmp_path, &self.path)
            .map_err(|err| ExtractError::file(&self.path, err))?;
        Ok(self.report)
    }

    pub fn discard(self) {
        let _ = std::fs::remove_file(&self.tmp_path);
    }
}

/// Write every table to a temp file first and rename them only once all
/// writes succeeded, so a failed write leaves existing seed files in place.
pub fn write_tables(
    dir: &Path,
    rendered: &[RenderedTable],
) -> Result<Vec<TableReport>, ExtractError> {
    create_dir_all(dir).map_err(|err| ExtractError::file(dir, err))?;

    let mut staged = Vec::with_capacity(rendered.len());
    for table in rendered {
        match stage_table(dir, table) {
            Ok(table) => staged.push(table),
            Err(err) => {
                staged.into_iter().for_each(StagedTable::discard);
                return Err(err);
            }
        }
    }

    staged.into_iter().map(StagedTable::commit).collect()
}

/// Write a rendered table to its temp file in `dir`, hashing the bytes on
/// the way.
pub fn stage_table(dir: &Path, rendered: &RenderedTable) -> Result<StagedTable, ExtractError> {
    let path = dir.join(&rendered.file);
    let tmp_path = temp_path(&path);

    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)
        .map_err(|err| ExtractError::file(&tmp_path, err))?;
    let mut writer = HashingWriter::new(BufWriter::new(file));
    let written = writer
        .write_all(rendered.sql.as_bytes())
        .and_then(|_| writer.flush());
    let (bytes, digest, inner) = writer.finish();
    let synced = written
        .and_then(|_| inner.into_inner().map_err(|err| err.into_error()))
        .and_then(|file| file.sync_all());
    if let Err(err) = synced {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(ExtractError::file(&tmp_path, err));
    }

    Ok(StagedTable {
        report: TableReport {
            table: rendered.table.clone(),
            file: rendered.file.clone(),
            rows: rendered.rows,
            bytes,
            sha256: digest,
        },
        tmp_path,
        path,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Counts and hashes every byte passed through.
struct HashingWriter<W: Write> {
    inner: W,
    bytes: u64,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes: 0,
            hasher: Sha256::new(),
        }
    }

    fn finish(self) -> (u64, String, W) {
        (self.bytes, hex::encode(self.hasher.finalize()), self.inner)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.hasher.update(&buf[..size]);
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
