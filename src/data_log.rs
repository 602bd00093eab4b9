use crate::{error::PathFileError, path::Waypoint, path_file::write_rows};
use std::io::Write;

const COLUMNS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataLogEntry {
    pub time_sec: f64,
    pub sentinel: Waypoint,
    pub target: Waypoint,
    pub error: f64,
    pub output: f64,
}

/// Append-only record of steering controller updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLog {
    entries: Vec<DataLogEntry>,
}

impl DataLog {
    pub fn push(&mut self, entry: DataLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DataLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the log as a table with columns
    /// `time sentinel.x sentinel.y sentinel.z target.x target.y target.z error output`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), PathFileError> {
        let rows: Vec<[f64; COLUMNS]> = self
            .entries
            .iter()
            .map(|entry| {
                let DataLogEntry {
                    time_sec,
                    sentinel,
                    target,
                    error,
                    output,
                } = *entry;
                [
                    time_sec, sentinel.x, sentinel.y, sentinel.z, target.x, target.y, target.z,
                    error, output,
                ]
            })
            .collect();

        write_rows(writer, &rows)
    }
}
