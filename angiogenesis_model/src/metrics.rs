use ndarray::{Array1, Axis};
use ndarray_stats::histogram::{Bins, Edges, Grid as HistogramGrid, HistogramExt};
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellType};
use crate::grid::Coord;
use crate::Real;

/// Live cell counts by type, kept in step with every creation and
/// destruction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
	pub empty: usize,
	pub normal: usize,
	pub cancer: usize,
	pub capillary: usize,
}

impl CellCounts {
	pub fn get(&self, cell_type: CellType) -> usize {
		match cell_type {
			CellType::Empty => self.empty,
			CellType::Normal => self.normal,
			CellType::Cancer => self.cancer,
			CellType::Capillary => self.capillary,
		}
	}

	fn slot(&mut self, cell_type: CellType) -> &mut usize {
		match cell_type {
			CellType::Empty => &mut self.empty,
			CellType::Normal => &mut self.normal,
			CellType::Cancer => &mut self.cancer,
			CellType::Capillary => &mut self.capillary,
		}
	}

	pub(crate) fn increment(&mut self, cell_type: CellType) {
		*self.slot(cell_type) += 1;
	}

	pub(crate) fn decrement(&mut self, cell_type: CellType) {
		let slot = self.slot(cell_type);
		*slot = slot.saturating_sub(1);
	}

	pub fn total(&self) -> usize {
		self.empty + self.normal + self.cancer + self.capillary
	}

	pub fn from_types<I: IntoIterator<Item = CellType>>(types: I) -> Self {
		let mut counts = CellCounts::default();
		for t in types {
			counts.increment(t);
		}
		counts
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
	pub position: Coord,
	pub kind: CellType,
	pub oxygen: Real,
	pub vegf: Real,
}

impl From<&Cell> for CellSnapshot {
	fn from(cell: &Cell) -> Self {
		CellSnapshot { position: cell.position(), kind: cell.cell_type(), oxygen: cell.oxygen(), vegf: cell.vegf() }
	}
}

/// State of a dish after `tick` steps, cells in registration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DishSnapshot {
	pub tick: u64,
	pub counts: CellCounts,
	pub cells: Vec<CellSnapshot>,
}

impl DishSnapshot {
	/// Counts derived by scanning the recorded cells.
	pub fn recount(&self) -> CellCounts {
		CellCounts::from_types(self.cells.iter().map(|c| c.kind))
	}

	/// `"<tick> <cancer> <capillary>"`, the line format of the recorded series.
	pub fn series_line(&self) -> String {
		series_line(self.tick, &self.counts)
	}

	/// Oxygen histogram over unit-width bins `[i, i + 1)` for `i` in
	/// `0..bins`. Levels at or above `bins` are not counted.
	pub fn oxygen_histogram(&self, bins: usize) -> Vec<usize> {
		oxygen_histogram(self.cells.iter().map(|c| c.oxygen), bins)
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}

	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}
}

pub fn series_line(tick: u64, counts: &CellCounts) -> String {
	format!("{} {} {}", tick, counts.cancer, counts.capillary)
}

pub fn oxygen_histogram<I: IntoIterator<Item = Real>>(levels: I, bins: usize) -> Vec<usize> {
	if bins == 0 {
		return Vec::new();
	}
	let floors: Vec<i64> = levels.into_iter().map(|o| o.floor() as i64).collect();
	if floors.is_empty() {
		return vec![0; bins];
	}
	let observations = Array1::from(floors).insert_axis(Axis(1));
	let edges = Edges::from((0..=bins as i64).collect::<Vec<_>>());
	let grid = HistogramGrid::from(vec![Bins::new(edges)]);
	observations.histogram(grid).counts().iter().copied().collect()
}
