//! CSV export of session history.

use crate::{Result, WorkoutSession};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    lift: String,
    week: u32,
    cycle: u32,
    completed: bool,
    amrap_reps: u32,
    amrap_weight: f64,
    estimated_one_rep_max: f64,
}

impl From<&WorkoutSession> for CsvRow {
    fn from(session: &WorkoutSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            date: session.date.to_rfc3339(),
            lift: session.main_lift.name().to_string(),
            week: session.week,
            cycle: session.cycle,
            completed: session.is_completed,
            amrap_reps: session.amrap_reps,
            amrap_weight: session.amrap_weight,
            estimated_one_rep_max: session.estimated_one_rep_max(),
        }
    }
}

/// Write sessions to a CSV file, replacing any existing file
///
/// Returns the number of rows written.
pub fn export_sessions_csv(sessions: &[WorkoutSession], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if sessions.is_empty() {
        // serde only emits the header alongside the first record
        writer.write_record([
            "id",
            "date",
            "lift",
            "week",
            "cycle",
            "completed",
            "amrap_reps",
            "amrap_weight",
            "estimated_one_rep_max",
        ])?;
    }
    for session in sessions {
        writer.serialize(CsvRow::from(session))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} sessions to {:?}", sessions.len(), path);
    Ok(sessions.len())
}
