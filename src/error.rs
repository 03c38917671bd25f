//! Construction-time errors
//!
//! The simulation itself never fails at runtime: bad numeric state is guarded
//! inside the integrator. These errors cover data handed in from outside
//! (level grids, tuning files, recorded replays).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Grid code count does not match width x height
    #[error("grid of {width}x{height} needs {needed} tiles, got {len}", needed = .width * .height)]
    GridSize {
        width: usize,
        height: usize,
        len: usize,
    },
    /// Tile code outside {0 empty, 1 solid, 2 target}
    #[error("unknown tile code {code} at index {index}")]
    UnknownTile { index: usize, code: u8 },
    /// Rows of a text grid have different lengths
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    /// Malformed JSON (tuning or replay)
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading a tuning or replay file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_message() {
        let err = SimError::GridSize {
            width: 4,
            height: 2,
            len: 7,
        };
        assert_eq!(err.to_string(), "grid of 4x2 needs 8 tiles, got 7");
    }

    #[test]
    fn test_json_error_has_source() {
        let err: SimError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid json: "));
    }

    #[test]
    fn test_io_error_converts() {
        let err: SimError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, SimError::Io(_)));
        assert_eq!(err.to_string(), "io error: gone");
    }

    #[test]
    fn test_tile_messages() {
        let err = SimError::UnknownTile { index: 3, code: 9 };
        assert_eq!(err.to_string(), "unknown tile code 9 at index 3");
        let err = SimError::RaggedRow {
            row: 1,
            expected: 4,
            found: 2,
        };
        assert_eq!(err.to_string(), "row 1 has 2 columns, expected 4");
    }
}
