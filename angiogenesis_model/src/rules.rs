//! Per-tick transition rules for every cell kind.
//!
//! Rules run sequentially in registration order and write straight into the
//! shared tissue, so a cell processed later in a tick sees every change made
//! by the cells before it.

use tracing::debug;

use crate::cell::{CellKind, CellType};
use crate::error::DishError;
use crate::model::TumorModel;
use crate::rng::RollSource;
use crate::tissue::{CellId, Tissue};

/// Whether a cell is still resident after its maintenance step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Fate {
	Alive,
	Replaced,
}

pub(crate) fn step_cell<R: RollSource>(
	tissue: &mut Tissue,
	model: &TumorModel,
	rng: &mut R,
	id: CellId,
) -> Result<(), DishError> {
	// cells replaced earlier in the tick are skipped
	let kind = match tissue.cell(id) {
		Some(cell) => cell.kind(),
		None => return Ok(()),
	};
	match kind {
		CellKind::Empty => maintain(tissue, model, rng, id).map(|_| ()),
		CellKind::Normal => {
			if let Some(cell) = tissue.cell_mut(id) {
				cell.subtract_oxygen(model.normal_oxygen_consumption);
			}
			maintain(tissue, model, rng, id).map(|_| ())
		}
		CellKind::Cancer { .. } => step_cancer(tissue, model, rng, id),
		CellKind::Capillary { supply, activated } => step_capillary(tissue, model, rng, id, supply, activated),
	}
}

/// Aging, baseline consumption, oxygen and VEGF diffusion, then the
/// deactivation roll.
pub(crate) fn maintain<R: RollSource>(
	tissue: &mut Tissue,
	model: &TumorModel,
	rng: &mut R,
	id: CellId,
) -> Result<Fate, DishError> {
	match tissue.cell_mut(id) {
		Some(cell) => {
			cell.age_in_steps += 1;
			cell.subtract_oxygen(model.cell_oxygen_consumption);
		}
		None => return Ok(Fate::Replaced),
	}

	let mut targets = tissue.neighbor_ids(id);
	diffuse_oxygen(tissue, model, id, &mut targets);
	diffuse_vegf(tissue, id, &mut targets);

	let (age, oxygen, cell_type) = match tissue.cell(id) {
		Some(cell) => (cell.age_in_steps, cell.oxygen, cell.cell_type()),
		None => return Ok(Fate::Replaced),
	};
	if age > model.cell_deactivation_min_steps && oxygen < model.deactivation_oxygen_limit {
		return roll_for_deactivation(tissue, model, rng, id, cell_type, oxygen);
	}
	Ok(Fate::Alive)
}

// Neighbors are visited from the most depleted up; the sort is stable so
// ties keep enumeration order.
fn diffuse_oxygen(tissue: &mut Tissue, model: &TumorModel, id: CellId, targets: &mut [CellId]) {
	targets.sort_by(|a, b| oxygen_of(tissue, *a).total_cmp(&oxygen_of(tissue, *b)));
	for &t in targets.iter() {
		let theirs = match tissue.cell(t) {
			Some(cell) if !cell.is(CellType::Capillary) => cell.oxygen,
			_ => continue,
		};
		let own = oxygen_of(tissue, id);
		let share = (own - theirs).abs() / 3.;
		if own > share && own > theirs {
			if let Some(cell) = tissue.cell_mut(id) {
				cell.subtract_oxygen(share);
			}
			if let Some(cell) = tissue.cell_mut(t) {
				cell.add_oxygen(share, model.max_oxygen_capacity);
			}
		}
	}
}

fn diffuse_vegf(tissue: &mut Tissue, id: CellId, targets: &mut [CellId]) {
	targets.sort_by(|a, b| vegf_of(tissue, *a).total_cmp(&vegf_of(tissue, *b)));
	for &t in targets.iter() {
		let share = (vegf_of(tissue, id) - vegf_of(tissue, t)) / 2.;
		if share > 0. {
			if let Some(cell) = tissue.cell_mut(id) {
				cell.vegf -= share;
			}
			if let Some(cell) = tissue.cell_mut(t) {
				cell.vegf += share;
			}
		}
	}
}

fn roll_for_deactivation<R: RollSource>(
	tissue: &mut Tissue,
	model: &TumorModel,
	rng: &mut R,
	id: CellId,
	cell_type: CellType,
	oxygen: crate::Real,
) -> Result<Fate, DishError> {
	// empty cells never die and never consume a roll
	if cell_type == CellType::Empty {
		return Ok(Fate::Alive);
	}
	let roll = rng.roll();
	if roll > model.deactivation_base + oxygen * model.deactivation_oxygen_slope {
		tissue.replace(id, CellKind::Empty)?;
		debug!(?cell_type, oxygen, "cell died");
		return Ok(Fate::Replaced);
	}
	Ok(Fate::Alive)
}

fn step_cancer<R: RollSource>(
	tissue: &mut Tissue,
	model: &TumorModel,
	rng: &mut R,
	id: CellId,
) -> Result<(), DishError> {
	let starving = match tissue.cell_mut(id) {
		Some(cell) => {
			cell.subtract_oxygen(model.cancer_oxygen_consumption);
			cell.oxygen < model.cancer_oxygen_vegf_limit
		}
		None => return Ok(()),
	};
	if starving && rng.roll() < model.cancer_vegf_chance {
		if let Some(cell) = tissue.cell_mut(id) {
			cell.set_vegf_mutated();
		}
	}

	// no break: one cell may fill several empty neighbors while its oxygen lasts
	for t in tissue.neighbor_ids(id) {
		let roll = rng.roll();
		let (oxygen, vegf_mutated) = match tissue.cell(id) {
			Some(cell) => (cell.oxygen, cell.vegf_mutated()),
			None => break,
		};
		let target_empty = tissue.cell(t).map_or(false, |c| c.is(CellType::Empty));
		if oxygen > model.cancer_oxygen_duplication_limit && target_empty && roll < model.cancer_duplication_chance {
			if let Some(cell) = tissue.cell_mut(id) {
				cell.subtract_oxygen(model.cancer_duplication_oxygen_cost);
			}
			tissue.replace(t, CellKind::Cancer { vegf_mutated })?;
			debug!(vegf_mutated, "cancer duplicated");
		}
	}

	secrete_vegf(tissue, model, id);
	if maintain(tissue, model, rng, id)? == Fate::Alive {
		secrete_vegf(tissue, model, id);
	}
	Ok(())
}

fn secrete_vegf(tissue: &mut Tissue, model: &TumorModel, id: CellId) {
	if let Some(cell) = tissue.cell_mut(id) {
		if cell.vegf_mutated() {
			cell.vegf = model.cancer_vegf_supply;
		}
	}
}

fn step_capillary<R: RollSource>(
	tissue: &mut Tissue,
	model: &TumorModel,
	rng: &mut R,
	id: CellId,
	supply: crate::Real,
	activated: bool,
) -> Result<(), DishError> {
	if activated {
		for t in tissue.neighbor_ids(id) {
			let target_type = match tissue.cell_mut(t) {
				Some(cell) => {
					if !cell.is(CellType::Capillary) {
						cell.add_oxygen(supply, model.max_oxygen_capacity);
					}
					cell.cell_type()
				}
				None => continue,
			};

			let around = tissue.neighbor_ids(t);
			let capillaries = around
				.iter()
				.filter(|&&n| tissue.cell(n).map_or(false, |c| c.is(CellType::Capillary)))
				.count();
			if capillaries < model.capillary_growth_density_limit
				&& vegf_of(tissue, t) > model.capillary_sprout_vegf_threshold
				&& target_type == CellType::Empty
				&& supply > model.capillary_min_sprout_supply
			{
				let roll = rng.roll();
				if roll < model.capillary_sprout_chance {
					// sprouting consumes the local signal
					for &n in around.iter().chain(std::iter::once(&t)) {
						if let Some(cell) = tissue.cell_mut(n) {
							cell.vegf = 0.;
						}
					}
					let child_supply = model.capillary_growth_fraction * supply;
					tissue.replace(t, CellKind::Capillary { supply: child_supply, activated: true })?;
					debug!(supply = child_supply, "capillary sprouted");
				}
			}
		}
	}

	if let Some(cell) = tissue.cell_mut(id) {
		cell.oxygen = supply.min(model.max_oxygen_capacity).max(0.);
	}
	Ok(())
}

fn oxygen_of(tissue: &Tissue, id: CellId) -> crate::Real {
	tissue.cell(id).map_or(0., |c| c.oxygen)
}

fn vegf_of(tissue: &Tissue, id: CellId) -> crate::Real {
	tissue.cell(id).map_or(0., |c| c.vegf)
}
