use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::DishError;

/// Lattice coordinate, `x` is the column and `y` the row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
	pub x: usize,
	pub y: usize,
}

impl Coord {
	pub const fn new(x: usize, y: usize) -> Self {
		Coord { x, y }
	}
}

impl fmt::Display for Coord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.x, self.y)
	}
}

/// Fixed size, non-wrapping lattice holding at most one item per coordinate.
#[derive(Clone, Debug)]
pub struct Grid<T> {
	slots: Array2<Option<T>>,
}

impl<T: Copy> Grid<T> {
	pub fn new(width: usize, height: usize) -> Result<Self, DishError> {
		if width == 0 || height == 0 {
			return Err(DishError::invalid("grid dimensions must be non-zero"));
		}
		Ok(Grid { slots: Array2::from_elem((width, height), None) })
	}

	pub fn width(&self) -> usize {
		self.slots.shape()[0]
	}

	pub fn height(&self) -> usize {
		self.slots.shape()[1]
	}

	pub fn contains(&self, coord: Coord) -> bool {
		coord.x < self.width() && coord.y < self.height()
	}

	pub fn get(&self, coord: Coord) -> Option<T> {
		self.slots.get([coord.x, coord.y]).copied().flatten()
	}

	pub fn place(&mut self, item: T, coord: Coord) -> Result<(), DishError> {
		let (width, height) = (self.width(), self.height());
		let slot = self
			.slots
			.get_mut([coord.x, coord.y])
			.ok_or(DishError::OutOfBounds { coord, width, height })?;
		if slot.is_some() {
			return Err(DishError::Occupied(coord));
		}
		*slot = Some(item);
		Ok(())
	}

	pub fn remove(&mut self, coord: Coord) -> Result<T, DishError> {
		self.slots
			.get_mut([coord.x, coord.y])
			.and_then(Option::take)
			.ok_or(DishError::NotFound(coord))
	}

	/// Moore-adjacent coordinates inside the lattice, row by row
	/// (`dy` outer, `dx` inner). Edge coordinates have fewer than 8.
	pub fn neighborhood(&self, coord: Coord) -> impl Iterator<Item = Coord> {
		let (width, height) = (self.width() as isize, self.height() as isize);
		let (cx, cy) = (coord.x as isize, coord.y as isize);
		(-1isize..=1)
			.flat_map(|dy| (-1isize..=1).map(move |dx| (dx, dy)))
			.filter(|&(dx, dy)| dx != 0 || dy != 0)
			.map(move |(dx, dy)| (cx + dx, cy + dy))
			.filter(move |&(x, y)| x >= 0 && y >= 0 && x < width && y < height)
			.map(|(x, y)| Coord::new(x as usize, y as usize))
	}

	/// Occupants of the Moore neighborhood, in `neighborhood` order.
	pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = T> + '_ {
		self.neighborhood(coord).filter_map(move |c| self.get(c))
	}

	/// Every coordinate, x-major (x outer, y inner).
	pub fn coords(&self) -> impl Iterator<Item = Coord> {
		let (width, height) = (self.width(), self.height());
		(0..width).flat_map(move |x| (0..height).map(move |y| Coord::new(x, y)))
	}

	pub fn occupied(&self) -> usize {
		self.slots.iter().filter(|s| s.is_some()).count()
	}
}
