use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::cell::{Cell, CellKind};
use crate::error::DishError;
use crate::grid::{Coord, Grid};
use crate::metrics::CellCounts;
use crate::schedule::Schedule;

new_key_type! {
	/// Generational handle of a live cell. A replacement always gets a
	/// fresh handle, so stale handles never alias the new occupant.
	pub struct CellId;
}

/// Grid, schedule and cell arena, mutated together so that no coordinate
/// is ever observed vacant or doubly occupied.
#[derive(Clone, Debug)]
pub(crate) struct Tissue {
	pub(crate) cells: SlotMap<CellId, Cell>,
	pub(crate) grid: Grid<CellId>,
	pub(crate) schedule: Schedule<CellId>,
	pub(crate) counts: CellCounts,
}

impl Tissue {
	pub(crate) fn new(width: usize, height: usize) -> Result<Self, DishError> {
		let grid = Grid::new(width, height)?;
		Ok(Tissue {
			cells: SlotMap::with_capacity_and_key(width * height),
			grid,
			schedule: Schedule::with_capacity(width * height),
			counts: CellCounts::default(),
		})
	}

	pub(crate) fn insert(&mut self, mut cell: Cell, coord: Coord) -> Result<CellId, DishError> {
		if !self.grid.contains(coord) {
			return Err(DishError::OutOfBounds { coord, width: self.grid.width(), height: self.grid.height() });
		}
		if self.grid.get(coord).is_some() {
			return Err(DishError::Occupied(coord));
		}
		cell.position = coord;
		let cell_type = cell.cell_type();
		let id = self.cells.insert(cell);
		self.grid.place(id, coord)?;
		self.schedule.add(id);
		self.counts.increment(cell_type);
		Ok(id)
	}

	/// Destroys `id` and creates a new cell of `kind` at the same coordinate.
	pub(crate) fn replace(&mut self, id: CellId, kind: CellKind) -> Result<CellId, DishError> {
		let coord = self.cells.get(id).ok_or(DishError::NotScheduled)?.position;
		let resident = self.grid.remove(coord)?;
		if resident != id {
			self.grid.place(resident, coord)?;
			return Err(DishError::NotFound(coord));
		}
		self.schedule.remove(id)?;
		if let Some(old) = self.cells.remove(id) {
			self.counts.decrement(old.cell_type());
			debug!(x = coord.x, y = coord.y, from = ?old.cell_type(), to = ?kind.cell_type(), "cell replaced");
		}
		self.insert(Cell::new(kind), coord)
	}

	pub(crate) fn cell(&self, id: CellId) -> Option<&Cell> {
		self.cells.get(id)
	}

	pub(crate) fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
		self.cells.get_mut(id)
	}

	pub(crate) fn at(&self, coord: Coord) -> Option<&Cell> {
		self.grid.get(coord).and_then(|id| self.cells.get(id))
	}

	pub(crate) fn neighbor_ids(&self, id: CellId) -> Vec<CellId> {
		match self.cells.get(id) {
			Some(cell) => self.grid.neighbors(cell.position).collect(),
			None => Vec::new(),
		}
	}

	/// Cells in registration order.
	pub(crate) fn scheduled(&self) -> impl Iterator<Item = &Cell> + '_ {
		self.schedule.iter().filter_map(move |id| self.cells.get(id))
	}

	/// Verifies every coordinate holds exactly one registered cell.
	pub(crate) fn check_occupancy(&self) -> Result<(), DishError> {
		for coord in self.grid.coords() {
			let id = self.grid.get(coord).ok_or(DishError::NotFound(coord))?;
			match self.cells.get(id) {
				Some(cell) if cell.position == coord => {}
				_ => return Err(DishError::NotFound(coord)),
			}
			if !self.schedule.contains(id) {
				return Err(DishError::NotScheduled);
			}
		}
		if self.schedule.len() != self.cells.len() || self.cells.len() != self.grid.occupied() {
			return Err(DishError::NotScheduled);
		}
		Ok(())
	}
}
