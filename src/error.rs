use thiserror::Error;

/// A trajectory that cannot be turned into a [PathModel](crate::path::PathModel).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidPathError {
    #[error("a path needs at least 2 points, found {0}")]
    TooFewPoints(usize),

    #[error("coordinate arrays differ in length: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("waypoint {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("waypoints {index} and {} coincide", .index + 1)]
    CoincidentPoints { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid time step {dt}, expected a finite positive value")]
pub struct InvalidTimestepError {
    pub dt: f64,
}

/// A vehicle state or controller input that is not a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{quantity} is not finite: {value}")]
pub struct InvalidVehicleStateError {
    pub quantity: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("gain `{name}` must be finite and non-negative, found {value}")]
    InvalidGain { name: &'static str, value: f64 },

    #[error("`{name}` must be in (0, {max}], found {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        max: f64,
    },

    #[error("controller is used before being initialized with gains")]
    Uninitialized,

    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum PathFileError {
    #[error("missing header line")]
    MissingHeader,

    #[error("malformed header, expected `<rows> <columns>`")]
    MalformedHeader,

    #[error("expected {expected} columns, found {found} on row {row}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("header announces {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("cannot parse value `{value}` on row {row}")]
    Value { row: usize, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error(transparent)]
    InvalidTimestep(#[from] InvalidTimestepError),

    #[error(transparent)]
    InvalidVehicleState(#[from] InvalidVehicleStateError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    PathFile(#[from] PathFileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
