use chrono::Local;
use csv::Writer;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::session::InputEvent;

pub const EXPORT_HEADER: [&str; 5] = ["Number", "Type", "Value", "Time (ms)", "Timestamp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Nothing to export; the caller shows a notice instead of writing a file.
    Empty,
}

/// Serialize the history in chronological order (oldest first) as CSV.
///
/// `history` is most-recent-first, as the session keeps it.
pub fn write_history<W: Write>(history: &[InputEvent], out: W) -> csv::Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(EXPORT_HEADER)?;

    for event in history.iter().rev() {
        writer.write_record([
            event.sequence_number.to_string(),
            event.kind.to_string(),
            event.label.clone(),
            event.interval_ms.to_string(),
            event.captured_at.format("%H:%M:%S").to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the history to a timestamp-named file in the working directory.
pub fn export_history(history: &[InputEvent]) -> io::Result<ExportOutcome> {
    if history.is_empty() {
        return Ok(ExportOutcome::Empty);
    }

    let path = PathBuf::from(format!(
        "click-test-results-{}.csv",
        Local::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    write_history(history, file).map_err(io::Error::other)?;

    Ok(ExportOutcome::Written(path))
}
