use bson::Document as BsonDocument;
use serde_json::json;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::csv::read_csv;
use super::detect::detect_format;
use super::json::{read_array, read_ndjson};
use super::options::{SeedFormat, SeedOptions, SeedReport};
use crate::document::Document;
use crate::errors::AppError;
use crate::store::RecordStore;

/// Seeds `store` from a file, detecting the format when `opts.format` is `Auto`.
///
/// # Errors
/// I/O failures, store failures, and malformed input when `skip_errors` is off.
pub fn seed_file<P: AsRef<Path>>(
    store: &dyn RecordStore,
    path: P,
    opts: &SeedOptions,
) -> Result<SeedReport, AppError> {
    let path = path.as_ref();
    log::info!("seed: path={} append={}", path.display(), opts.append);
    let mut reader = BufReader::new(File::open(path)?);
    let format = match opts.format {
        SeedFormat::Auto => detect_format(&mut reader, path)?,
        other => other,
    };
    seed_from_reader(store, reader, format, opts)
}

/// Seeds `store` from any reader. `Auto` is read as NDJSON.
///
/// # Errors
/// I/O failures, store failures, and malformed input when `skip_errors` is off.
pub fn seed_from_reader<R: Read>(
    store: &dyn RecordStore,
    reader: R,
    format: SeedFormat,
    opts: &SeedOptions,
) -> Result<SeedReport, AppError> {
    let mut out = BatchWriter::new(store, opts)?;
    if !opts.append {
        out.report.cleared = store.clear()?;
        log::info!("seed: cleared {} existing records", out.report.cleared);
    }
    match format {
        SeedFormat::Csv => read_csv(reader, opts.delimiter, &mut out)?,
        SeedFormat::Json => read_array(reader, &mut out)?,
        SeedFormat::Auto | SeedFormat::Ndjson => read_ndjson(reader, &mut out)?,
    }
    let report = out.finish()?;
    log::info!(
        "seed: inserted {} records, skipped {}",
        report.inserted,
        report.skipped
    );
    Ok(report)
}

/// Buffers parsed records and flushes them to the store in batches.
pub(super) struct BatchWriter<'a> {
    store: &'a dyn RecordStore,
    batch: Vec<Document>,
    batch_size: usize,
    skip_errors: bool,
    progress_every: Option<u64>,
    sidecar: Option<File>,
    pub(super) report: SeedReport,
}

impl<'a> BatchWriter<'a> {
    fn new(store: &'a dyn RecordStore, opts: &SeedOptions) -> Result<Self, AppError> {
        let sidecar = match &opts.error_sidecar {
            Some(p) if opts.skip_errors => Some(File::create(p)?),
            _ => None,
        };
        Ok(Self {
            store,
            batch: Vec::with_capacity(opts.batch_size.max(1)),
            batch_size: opts.batch_size.max(1),
            skip_errors: opts.skip_errors,
            progress_every: opts.progress_every,
            sidecar,
            report: SeedReport::default(),
        })
    }

    pub(super) fn push(&mut self, data: BsonDocument) -> Result<(), AppError> {
        self.batch.push(Document::new(data));
        if self.batch.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Skips a bad input unit when allowed, otherwise fails with `err`.
    pub(super) fn reject(&mut self, at: u64, err: AppError, raw: Option<&str>) -> Result<(), AppError> {
        if !self.skip_errors {
            return Err(err);
        }
        log::warn!("seed: skipping input {at}: {err}");
        self.report.skipped += 1;
        if let Some(f) = self.sidecar.as_mut() {
            writeln!(f, "{}", json!({ "at": at, "error": err.to_string(), "record": raw }))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AppError> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let before = self.report.inserted;
        let n = self.store.insert_many(std::mem::take(&mut self.batch))?;
        self.report.inserted += n as u64;
        if let Some(every) = self.progress_every.filter(|e| *e > 0)
            && self.report.inserted / every > before / every
        {
            log::info!("seed: {} records so far", self.report.inserted);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<SeedReport, AppError> {
        self.flush()?;
        if let Some(f) = self.sidecar.as_mut() {
            f.flush()?;
        }
        Ok(self.report)
    }
}
