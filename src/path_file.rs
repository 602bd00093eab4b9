//! Plain text tables used for path files and controller data logs.
//!
//! The first line holds the row and column counts, followed by one
//! tab-delimited row per entry:
//!
//! ```text
//! 3	3
//! 0	0	0.5
//! 10	0	0.5
//! 10	10	0.5
//! ```

use crate::{
    constants::PATH_FILE_COLUMNS,
    error::{Error, PathFileError},
    path::{PathModel, Waypoint},
};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

pub fn write_rows<W, const N: usize>(writer: W, rows: &[[f64; N]]) -> Result<(), PathFileError>
where
    W: Write,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    writer.write_record([rows.len().to_string(), N.to_string()])?;
    for row in rows {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

pub fn read_rows<R, const N: usize>(reader: R) -> Result<Vec<[f64; N]>, PathFileError>
where
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = reader.records();

    let header = records.next().ok_or(PathFileError::MissingHeader)??;
    let (expected_rows, columns) = match (header.get(0), header.get(1), header.len()) {
        (Some(rows), Some(cols), 2) => {
            let rows: usize = rows.parse().map_err(|_| PathFileError::MalformedHeader)?;
            let cols: usize = cols.parse().map_err(|_| PathFileError::MalformedHeader)?;
            (rows, cols)
        }
        _ => return Err(PathFileError::MalformedHeader),
    };
    if columns != N {
        return Err(PathFileError::ColumnCount {
            row: 0,
            expected: N,
            found: columns,
        });
    }

    let rows = records
        .enumerate()
        .map(|(index, record)| {
            let record = record?;
            let row = index + 1;
            if record.len() != N {
                return Err(PathFileError::ColumnCount {
                    row,
                    expected: N,
                    found: record.len(),
                });
            }

            let mut values = [0.0; N];
            for (slot, field) in values.iter_mut().zip(record.iter()) {
                *slot = field.parse().map_err(|_| PathFileError::Value {
                    row,
                    value: field.to_string(),
                })?;
            }
            Ok(values)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if rows.len() != expected_rows {
        return Err(PathFileError::RowCount {
            expected: expected_rows,
            found: rows.len(),
        });
    }

    Ok(rows)
}

pub fn read<R: Read>(reader: R) -> Result<PathModel, Error> {
    let rows = read_rows::<_, PATH_FILE_COLUMNS>(reader)?;
    let waypoints = rows
        .into_iter()
        .map(|[x, y, z]| Waypoint::new(x, y, z))
        .collect();
    Ok(PathModel::new(waypoints)?)
}

pub fn write<W: Write>(writer: W, path: &PathModel) -> Result<(), Error> {
    let rows: Vec<[f64; PATH_FILE_COLUMNS]> =
        path.waypoints().iter().map(|p| [p.x, p.y, p.z]).collect();
    write_rows(writer, &rows)?;
    Ok(())
}

pub fn load<P: AsRef<Path>>(file: P) -> Result<PathModel, Error> {
    read(File::open(file)?)
}

pub fn save<P: AsRef<Path>>(file: P, path: &PathModel) -> Result<(), Error> {
    write(File::create(file)?, path)
}
