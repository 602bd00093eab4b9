/// Consecutive waypoints closer than this are considered coincident.
pub const POINT_TOLERANCE_M: f64 = 1e-9;

pub const DEFAULT_LOOK_AHEAD_M: f64 = 5.0;
pub const DEFAULT_TARGET_SPEED_MS: f64 = 12.0;
pub const DEFAULT_PATH_HEIGHT_M: f64 = 0.5;

pub const DEFAULT_STEER_KP: f64 = 0.5;
pub const DEFAULT_SPEED_KP: f64 = 0.4;

/// Bound on the magnitude of the integral term of both controllers.
pub const DEFAULT_INTEGRAL_LIMIT: f64 = 1.0;

/// Commands are normalized, so no PID output may exceed this magnitude.
pub const MAX_OUTPUT_LIMIT: f64 = 1.0;

/// Number of columns in a path file row (x, y, z).
pub const PATH_FILE_COLUMNS: usize = 3;
