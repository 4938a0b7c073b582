use serde_json::json;
use std::io::Write;

use super::command::Command;
use crate::App;
use crate::api::{ErrorLogPage, GridResponse};
use crate::errors::AppError;
use crate::import::{SeedFormat, SeedOptions, seed_file};
use crate::observe::{ErrorLogQuery, parse_instant};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Runs one command, writing its result to `out`.
///
/// # Errors
/// Store, I/O and input failures; an unknown id is reported as [`AppError::InvalidInput`].
pub fn run(app: &App, cmd: Command, mode: OutputMode, out: &mut dyn Write) -> Result<(), AppError> {
    match cmd {
        Command::Seed { file, format, append } => {
            let format = match format.as_deref() {
                Some(f) => f.parse::<SeedFormat>()?,
                None => SeedFormat::Auto,
            };
            let opts = SeedOptions { format, append, ..Default::default() };
            let report = seed_file(app.vehicles_store().as_ref(), &file, &opts)?;
            match mode {
                OutputMode::Json => writeln!(
                    out,
                    "{}",
                    json!({
                        "status": "Seeded",
                        "count": report.inserted,
                        "skipped": report.skipped,
                        "cleared": report.cleared,
                    })
                )?,
                OutputMode::Human => writeln!(
                    out,
                    "seeded {} records from {} (skipped {}, cleared {})",
                    report.inserted,
                    file.display(),
                    report.skipped,
                    report.cleared
                )?,
            }
        }
        Command::Count => {
            let n = app.vehicles.count()?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", json!({ "count": n }))?,
                OutputMode::Human => writeln!(out, "{n}")?,
            }
        }
        Command::Overview(params) => {
            let page = app.vehicles.overview(&params)?;
            let body = GridResponse::from(page);
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string(&body)?)?,
                OutputMode::Human => writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?,
            }
        }
        Command::Get { id } => {
            let doc = app
                .vehicles
                .get(&id)?
                .ok_or_else(|| AppError::InvalidInput(format!("item not found: {id}")))?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", doc.to_json())?,
                OutputMode::Human => writeln!(out, "{}", serde_json::to_string_pretty(&doc.to_json())?)?,
            }
        }
        Command::Delete { id } => {
            if !app.vehicles.delete(&id)? {
                return Err(AppError::InvalidInput(format!("item not found: {id}")));
            }
            match mode {
                OutputMode::Json => writeln!(out, "{}", json!({ "deleted": id }))?,
                OutputMode::Human => writeln!(out, "deleted {id}")?,
            }
        }
        Command::ErrorLogs { page, page_size } => {
            let q = ErrorLogQuery::from_params(page.as_deref(), page_size.as_deref(), None, None);
            let body = ErrorLogPage::from(app.error_logs.list(&q)?);
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string(&body)?)?,
                OutputMode::Human => {
                    for log in &body.logs {
                        writeln!(
                            out,
                            "{} {} {} {}",
                            log["timestamp"].as_str().unwrap_or("-"),
                            log["method"].as_str().unwrap_or("-"),
                            log["endpoint"].as_str().unwrap_or("-"),
                            log["message"].as_str().unwrap_or("")
                        )?;
                    }
                    writeln!(
                        out,
                        "page {}/{} ({} total)",
                        body.pagination.page, body.pagination.total_pages, body.pagination.total_count
                    )?;
                }
            }
        }
        Command::ClearErrorLogs { before } => {
            let before = match before.as_deref() {
                Some(raw) => Some(
                    parse_instant(raw)
                        .ok_or_else(|| AppError::InvalidInput(format!("invalid date: {raw}")))?,
                ),
                None => None,
            };
            let deleted = app.error_logs.clear(before)?;
            match mode {
                OutputMode::Json => {
                    writeln!(out, "{}", json!({ "success": true, "deleted": deleted }))?;
                }
                OutputMode::Human => writeln!(out, "deleted {deleted} error logs")?,
            }
        }
    }
    Ok(())
}
