use thiserror::Error;

use crate::grid::Coord;

/// Errors raised while building or stepping a petri dish.
///
/// Occupancy errors mean the one-cell-per-coordinate invariant was broken and
/// the run cannot continue; they are never retried.
#[derive(Debug, Error, PartialEq)]
pub enum DishError {
	#[error("coordinate {0} is already occupied")]
	Occupied(Coord),
	#[error("no cell resides at {0}")]
	NotFound(Coord),
	#[error("cell is not registered with the schedule")]
	NotScheduled,
	#[error("coordinate {coord} lies outside the {width}x{height} grid")]
	OutOfBounds { coord: Coord, width: usize, height: usize },
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),
}

impl DishError {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		DishError::InvalidConfiguration(message.into())
	}
}
