use serde::{Deserialize, Serialize};

use crate::grid::Coord;
use crate::Real;

/// Type tag of a cell. The discriminants are the values exported to numpy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
	Empty = 0,
	Normal = 1,
	Cancer = 2,
	Capillary = 3,
}

/// Per-variant state of a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CellKind {
	Empty,
	Normal,
	/// `vegf_mutated` never reverts once set.
	Cancer { vegf_mutated: bool },
	/// Capillaries donate `supply` oxygen to their neighbors every tick.
	Capillary { supply: Real, activated: bool },
}

impl CellKind {
	pub fn cell_type(&self) -> CellType {
		match self {
			CellKind::Empty => CellType::Empty,
			CellKind::Normal => CellType::Normal,
			CellKind::Cancer { .. } => CellType::Cancer,
			CellKind::Capillary { .. } => CellType::Capillary,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
	pub(crate) position: Coord,
	pub(crate) oxygen: Real,
	pub(crate) vegf: Real,
	pub(crate) age_in_steps: u64,
	pub(crate) kind: CellKind,
}

impl Cell {
	pub fn new(kind: CellKind) -> Self {
		Cell { position: Coord::new(0, 0), oxygen: 0., vegf: 0., age_in_steps: 0, kind }
	}

	pub fn empty() -> Self {
		Cell::new(CellKind::Empty)
	}

	pub fn normal() -> Self {
		Cell::new(CellKind::Normal)
	}

	pub fn cancer(vegf_mutated: bool) -> Self {
		Cell::new(CellKind::Cancer { vegf_mutated })
	}

	pub fn capillary(supply: Real) -> Self {
		Cell::new(CellKind::Capillary { supply, activated: true })
	}

	/// Starting oxygen, clamped at zero from below.
	pub fn with_oxygen(mut self, oxygen: Real) -> Self {
		self.oxygen = oxygen.max(0.);
		self
	}

	pub fn with_vegf(mut self, vegf: Real) -> Self {
		self.vegf = vegf.max(0.);
		self
	}

	pub fn with_age(mut self, age_in_steps: u64) -> Self {
		self.age_in_steps = age_in_steps;
		self
	}

	pub fn position(&self) -> Coord {
		self.position
	}

	pub fn oxygen(&self) -> Real {
		self.oxygen
	}

	pub fn vegf(&self) -> Real {
		self.vegf
	}

	pub fn age_in_steps(&self) -> u64 {
		self.age_in_steps
	}

	pub fn kind(&self) -> CellKind {
		self.kind
	}

	pub fn cell_type(&self) -> CellType {
		self.kind.cell_type()
	}

	pub fn is(&self, cell_type: CellType) -> bool {
		self.cell_type() == cell_type
	}

	pub fn add_oxygen(&mut self, amount: Real, capacity: Real) {
		if self.oxygen + amount < capacity {
			self.oxygen += amount;
		} else {
			self.oxygen = capacity;
		}
	}

	pub fn subtract_oxygen(&mut self, amount: Real) {
		if self.oxygen - amount >= 0. {
			self.oxygen -= amount;
		} else {
			self.oxygen = 0.;
		}
	}

	pub(crate) fn set_vegf_mutated(&mut self) {
		if let CellKind::Cancer { vegf_mutated } = &mut self.kind {
			*vegf_mutated = true;
		}
	}

	pub fn vegf_mutated(&self) -> bool {
		matches!(self.kind, CellKind::Cancer { vegf_mutated: true })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn oxygen_saturates_at_both_ends() {
		let mut cell = Cell::normal().with_oxygen(95.);
		cell.add_oxygen(10., 100.);
		assert_eq!(cell.oxygen(), 100.);
		cell.subtract_oxygen(150.);
		assert_eq!(cell.oxygen(), 0.);
		cell.add_oxygen(30., 100.);
		cell.subtract_oxygen(12.5);
		assert_eq!(cell.oxygen(), 17.5);
	}

	#[test]
	fn vegf_mutation_only_applies_to_cancer() {
		let mut cancer = Cell::cancer(false);
		cancer.set_vegf_mutated();
		assert!(cancer.vegf_mutated());

		let mut normal = Cell::normal();
		normal.set_vegf_mutated();
		assert!(!normal.vegf_mutated());
		assert_eq!(normal.kind(), CellKind::Normal);
	}
}
