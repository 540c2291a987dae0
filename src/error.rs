use crate::grid::Position;
use std::fmt;

/// Which end of a requested route an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    Goal,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Caller-input errors. "No path" is not one of these; searches report it as `Ok(None)`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathfindingError {
    #[error("{endpoint} {position} is outside the grid")]
    OutOfBounds { endpoint: Endpoint, position: Position },

    #[error("{endpoint} {position} is blocked by an obstacle")]
    BlockedEndpoint { endpoint: Endpoint, position: Position },

    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}

impl PathfindingError {
    /// The endpoint this error names, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            PathfindingError::OutOfBounds { endpoint, .. }
            | PathfindingError::BlockedEndpoint { endpoint, .. } => Some(*endpoint),
            PathfindingError::InvalidDimensions { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PathfindingError>;
