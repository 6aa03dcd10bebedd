use ndarray::Array2;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::{info, trace};

use crate::cell::{Cell, CellKind, CellType};
use crate::error::DishError;
use crate::grid::Coord;
use crate::metrics::{CellCounts, CellSnapshot, DishSnapshot};
use crate::model::{DishConfig, TumorModel};
use crate::rng::RollSource;
use crate::rules;
use crate::tissue::Tissue;
use crate::Real;

/// The cancer seed lands at most this many rows off the diagonal.
const CANCER_SEED_SPREAD: isize = 5;

/// A lattice of cells and the random stream driving them.
pub struct PetriDish<R = Pcg64> {
	model: TumorModel,
	tissue: Tissue,
	rng: R,
	tick: u64,
}

impl PetriDish<Pcg64> {
	/// Seeds a dish from `config`, using `config.rng_seed` when present.
	pub fn new(config: DishConfig) -> Result<Self, DishError> {
		let rng = match config.rng_seed {
			Some(seed) => Pcg64::seed_from_u64(seed),
			None => Pcg64::from_entropy(),
		};
		Self::with_rng(config, rng)
	}
}

impl<R: RollSource> PetriDish<R> {
	/// Stochastic initial population: a capillary column on the right edge,
	/// one cancer seed near the diagonal, normal and empty cells elsewhere.
	pub fn with_rng(config: DishConfig, mut rng: R) -> Result<Self, DishError> {
		config.validate()?;
		let DishConfig { width, height, proportion_normal, model, .. } = config;
		let cancer = pick_cancer_seed(width, height, &mut rng)?;

		let mut tissue = Tissue::new(width, height)?;
		for coord in tissue.grid.coords().collect::<Vec<_>>() {
			let roll = rng.roll();
			let cell = if coord.x == width - 1 {
				Cell::capillary(model.max_oxygen_capacity)
			} else if coord == cancer {
				Cell::cancer(false)
			} else if roll <= proportion_normal {
				Cell::normal()
			} else {
				Cell::empty()
			};
			tissue.insert(cell, coord)?;
		}

		info!(
			width,
			height,
			cancer_x = cancer.x,
			cancer_y = cancer.y,
			normal = tissue.counts.normal,
			capillary = tissue.counts.capillary,
			"seeded petri dish"
		);
		Ok(PetriDish { model, tissue, rng, tick: 0 })
	}

	/// Builds a dish with a caller-chosen cell at every coordinate, placed
	/// and registered in x-major order. Cells holding more oxygen than the
	/// model allows, or capillaries with a negative supply, are rejected.
	pub fn from_layout<F>(model: TumorModel, width: usize, height: usize, rng: R, mut layout: F) -> Result<Self, DishError>
	where
		F: FnMut(Coord) -> Cell,
	{
		model.validate()?;
		let mut tissue = Tissue::new(width, height)?;
		for coord in tissue.grid.coords().collect::<Vec<_>>() {
			let cell = layout(coord);
			check_layout_cell(&cell, &model, coord)?;
			tissue.insert(cell, coord)?;
		}
		Ok(PetriDish { model, tissue, rng, tick: 0 })
	}

	/// Runs every registered cell once, in registration order.
	///
	/// Cells replaced earlier in the tick are skipped; cells created during
	/// the tick are first visited on the next one.
	pub fn step(&mut self) -> Result<(), DishError> {
		for id in self.tissue.schedule.snapshot() {
			rules::step_cell(&mut self.tissue, &self.model, &mut self.rng, id)?;
		}
		self.tick += 1;
		trace!(
			tick = self.tick,
			cancer = self.tissue.counts.cancer,
			capillary = self.tissue.counts.capillary,
			"tick complete"
		);
		Ok(())
	}

	pub fn run(&mut self, ticks: u64) -> Result<(), DishError> {
		for _ in 0..ticks {
			self.step()?;
		}
		Ok(())
	}

	pub fn tick(&self) -> u64 {
		self.tick
	}

	pub fn model(&self) -> &TumorModel {
		&self.model
	}

	pub fn width(&self) -> usize {
		self.tissue.grid.width()
	}

	pub fn height(&self) -> usize {
		self.tissue.grid.height()
	}

	/// Number of registered cells.
	pub fn len(&self) -> usize {
		self.tissue.schedule.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tissue.schedule.is_empty()
	}

	/// Running counts maintained at every creation and destruction.
	pub fn counts(&self) -> CellCounts {
		self.tissue.counts
	}

	/// Counts derived by scanning the registered cells.
	pub fn recount(&self) -> CellCounts {
		CellCounts::from_types(self.cells().map(Cell::cell_type))
	}

	pub fn count_cells(&self, cell_type: CellType) -> usize {
		self.tissue.counts.get(cell_type)
	}

	pub fn cell_at(&self, coord: Coord) -> Option<&Cell> {
		self.tissue.at(coord)
	}

	/// Cells in registration order.
	pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
		self.tissue.scheduled()
	}

	pub fn check_occupancy(&self) -> Result<(), DishError> {
		self.tissue.check_occupancy()
	}

	pub fn snapshot(&self) -> DishSnapshot {
		DishSnapshot { tick: self.tick, counts: self.counts(), cells: self.cells().map(CellSnapshot::from).collect() }
	}

	pub fn oxygen_field(&self) -> Array2<Real> {
		self.field(|c| c.oxygen())
	}

	pub fn vegf_field(&self) -> Array2<Real> {
		self.field(|c| c.vegf())
	}

	/// Cell type tags indexed `[x, y]`, see [`CellType`] for the values.
	pub fn type_field(&self) -> Array2<i32> {
		Array2::from_shape_fn((self.width(), self.height()), |(x, y)| {
			self.cell_at(Coord::new(x, y)).map_or(-1, |c| c.cell_type() as i32)
		})
	}

	fn field<F: Fn(&Cell) -> Real>(&self, value: F) -> Array2<Real> {
		Array2::from_shape_fn((self.width(), self.height()), |(x, y)| {
			self.cell_at(Coord::new(x, y)).map_or(0., |c| value(c))
		})
	}
}

fn check_layout_cell(cell: &Cell, model: &TumorModel, coord: Coord) -> Result<(), DishError> {
	if !(cell.oxygen() <= model.max_oxygen_capacity) {
		return Err(DishError::invalid(format!(
			"cell at {} starts with oxygen {} above the capacity {}",
			coord,
			cell.oxygen(),
			model.max_oxygen_capacity
		)));
	}
	if !cell.vegf().is_finite() {
		return Err(DishError::invalid(format!("cell at {} starts with a non-finite vegf level", coord)));
	}
	if let CellKind::Capillary { supply, .. } = cell.kind() {
		if !(supply.is_finite() && supply >= 0.) {
			return Err(DishError::invalid(format!("capillary at {} has invalid supply {}", coord, supply)));
		}
	}
	Ok(())
}

// x is drawn first among columns with at least one valid row, then y among
// the rows within the spread of the diagonal, never on it.
fn pick_cancer_seed<R: RollSource>(width: usize, height: usize, rng: &mut R) -> Result<Coord, DishError> {
	let rows = |x: usize| -> Vec<usize> {
		let x = x as isize;
		(x - CANCER_SEED_SPREAD..=x + CANCER_SEED_SPREAD)
			.filter(|&y| y >= 0 && y < height as isize && y != x)
			.map(|y| y as usize)
			.collect()
	};
	let columns: Vec<usize> = (width / 4..width.saturating_sub(1)).filter(|&x| !rows(x).is_empty()).collect();
	if columns.is_empty() {
		return Err(DishError::invalid("grid too small to seed a cancer cell"));
	}
	let x = columns[rng.pick(columns.len())];
	let candidates = rows(x);
	let y = candidates[rng.pick(candidates.len())];
	Ok(Coord::new(x, y))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rng::FixedRoll;

	fn config(width: usize, height: usize, seed: u64) -> DishConfig {
		DishConfig { width, height, rng_seed: Some(seed), ..DishConfig::default() }
	}

	#[test]
	fn initial_layout_has_capillary_column_and_one_cancer() {
		let dish = PetriDish::new(config(20, 20, 3)).unwrap();
		assert_eq!(dish.len(), 400);
		assert_eq!(dish.count_cells(CellType::Capillary), 20);
		assert_eq!(dish.count_cells(CellType::Cancer), 1);
		for y in 0..20 {
			assert!(dish.cell_at(Coord::new(19, y)).unwrap().is(CellType::Capillary));
		}
		let seed = dish.cells().find(|c| c.is(CellType::Cancer)).unwrap().position();
		assert!(seed.x >= 5 && seed.x <= 18);
		assert_ne!(seed.x, seed.y);
		assert!((seed.x as isize - seed.y as isize).abs() <= CANCER_SEED_SPREAD);
		assert_eq!(dish.counts(), dish.recount());
		dish.check_occupancy().unwrap();
	}

	#[test]
	fn proportion_bounds_select_cell_types() {
		let all_normal = PetriDish::with_rng(config(6, 6, 0), FixedRoll(0.3)).unwrap();
		assert_eq!(all_normal.count_cells(CellType::Normal), 6 * 6 - 6 - 1);

		let none_normal = PetriDish::with_rng(
			DishConfig { proportion_normal: 0., ..config(6, 6, 0) },
			FixedRoll(0.3),
		)
		.unwrap();
		assert_eq!(none_normal.count_cells(CellType::Normal), 0);
		assert_eq!(none_normal.count_cells(CellType::Empty), 6 * 6 - 6 - 1);
	}

	#[test]
	fn tiny_grids_cannot_seed_cancer() {
		let result = PetriDish::with_rng(config(2, 1, 0), FixedRoll(0.));
		assert!(matches!(result, Err(DishError::InvalidConfiguration(_))));
		assert!(PetriDish::with_rng(config(2, 2, 0), FixedRoll(0.)).is_ok());
	}

	#[test]
	fn fields_follow_grid_indexing() {
		let dish = PetriDish::from_layout(TumorModel::default(), 3, 2, FixedRoll(0.), |c| {
			if c.x == 2 { Cell::capillary(40.) } else { Cell::normal().with_oxygen(c.y as Real) }
		})
		.unwrap();
		let types = dish.type_field();
		assert_eq!(types.shape(), &[3, 2]);
		assert_eq!(types[[2, 1]], CellType::Capillary as i32);
		assert_eq!(dish.oxygen_field()[[0, 1]], 1.);
		assert_eq!(dish.vegf_field().shape(), &[3, 2]);
	}

	#[test]
	fn vegf_field_tracks_secretion() {
		let mut dish = PetriDish::from_layout(TumorModel::default(), 2, 1, FixedRoll(0.5), |c| {
			if c.x == 0 { Cell::cancer(true).with_oxygen(80.) } else { Cell::normal() }
		})
		.unwrap();
		dish.step().unwrap();
		let vegf = dish.vegf_field();
		assert_eq!(vegf[[0, 0]], dish.model().cancer_vegf_supply);
		assert_eq!(vegf[[1, 0]], dish.model().cancer_vegf_supply / 2.);
	}

	#[test]
	fn layouts_above_capacity_are_rejected() {
		let result = PetriDish::from_layout(TumorModel::default(), 2, 1, FixedRoll(0.), |c| {
			if c.x == 0 { Cell::normal().with_oxygen(500.) } else { Cell::empty() }
		});
		assert!(matches!(result, Err(DishError::InvalidConfiguration(_))));
	}

	#[test]
	fn capillaries_with_negative_supply_are_rejected() {
		let result = PetriDish::from_layout(TumorModel::default(), 2, 1, FixedRoll(0.), |c| {
			if c.x == 1 { Cell::capillary(-10.) } else { Cell::empty() }
		});
		assert!(matches!(result, Err(DishError::InvalidConfiguration(_))));

		let at_cap = PetriDish::from_layout(TumorModel::default(), 2, 1, FixedRoll(0.), |c| {
			if c.x == 1 { Cell::capillary(0.) } else { Cell::empty().with_oxygen(100.) }
		});
		assert!(at_cap.is_ok());
	}
}
