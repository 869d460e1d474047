use countdown_core::dates::{self, CalendarDay};
use countdown_core::model::{Completion, Project};
use sqlx::Row;

use crate::repository::{ProjectRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range: {v}")))
}

pub(crate) fn parse_day(field: &'static str, raw: &str) -> Result<CalendarDay, StorageError> {
    dates::parse_date_key(raw)
        .ok_or_else(|| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

pub(crate) fn encode_completions(completions: &[Completion]) -> Result<String, StorageError> {
    serde_json::to_string(completions).map_err(ser)
}

pub(crate) fn decode_completions(raw: &str) -> Result<Vec<Completion>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_project_row(row: &sqlx::sqlite::SqliteRow) -> Result<Project, StorageError> {
    let record = ProjectRecord {
        total_pages: i64_to_u32("total_pages", row.try_get("total_pages").map_err(ser)?)?,
        start_date: parse_day(
            "start_date",
            &row.try_get::<String, _>("start_date").map_err(ser)?,
        )?,
        end_date: parse_day("end_date", &row.try_get::<String, _>("end_date").map_err(ser)?)?,
        completions: decode_completions(&row.try_get::<String, _>("completions").map_err(ser)?)?,
        locked_frontier: i64_to_u32(
            "locked_frontier",
            row.try_get("locked_frontier").map_err(ser)?,
        )?,
        created_at: row.try_get("created_at").map_err(ser)?,
    };
    record.into_project().map_err(ser)
}
