use std::io::{self, BufRead};
use std::path::Path;

use super::SeedFormat;

/// By extension first, then by the first non-blank byte: `[` is a JSON array, `{` is NDJSON,
/// anything else is CSV.
pub fn detect_format<R: BufRead>(reader: &mut R, path: &Path) -> io::Result<SeedFormat> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        match ext.to_lowercase().as_str() {
            "csv" => return Ok(SeedFormat::Csv),
            "json" => return Ok(SeedFormat::Json),
            "ndjson" | "jsonl" => return Ok(SeedFormat::Ndjson),
            _ => {}
        }
    }
    let buf = reader.fill_buf()?;
    let head = String::from_utf8_lossy(&buf[..buf.len().min(256)]);
    Ok(match head.trim_start().chars().next() {
        Some('[') => SeedFormat::Json,
        Some('{') => SeedFormat::Ndjson,
        _ => SeedFormat::Csv,
    })
}
