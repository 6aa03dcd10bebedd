#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DishError;
use crate::Real;

//Contains the biological parameters that set the rules for a tumor model
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TumorModel {
	/// Baseline oxygen every non-capillary cell burns during maintenance.
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cell_oxygen_consumption: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub max_oxygen_capacity: Real,
	/// Cells younger than this never roll for deactivation.
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cell_deactivation_min_steps: u64,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub normal_oxygen_consumption: Real,
	/// Oxygen a cancer cell burns before anything else in its tick.
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_oxygen_consumption: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_oxygen_vegf_limit: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_vegf_chance: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_vegf_supply: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_oxygen_duplication_limit: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_duplication_chance: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub cancer_duplication_oxygen_cost: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub capillary_growth_density_limit: usize,
	/// Supply of a sprouted capillary relative to its parent.
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub capillary_growth_fraction: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub capillary_sprout_vegf_threshold: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub capillary_min_sprout_supply: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub capillary_sprout_chance: Real,
	/// Starved cells (below this oxygen) roll for deactivation.
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub deactivation_oxygen_limit: Real,
	/// A cell dies when `roll > deactivation_base + oxygen * deactivation_oxygen_slope`.
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub deactivation_base: Real,
	#[cfg_attr(feature = "python", pyo3(get, set))]
	pub deactivation_oxygen_slope: Real,
}

impl Default for TumorModel {
	fn default() -> Self {
		TumorModel {
			cell_oxygen_consumption: 1.,
			max_oxygen_capacity: 100.,
			cell_deactivation_min_steps: 10,
			normal_oxygen_consumption: 2.,
			cancer_oxygen_consumption: 10.,
			cancer_oxygen_vegf_limit: 30.,
			cancer_vegf_chance: 0.05,
			cancer_vegf_supply: 50.,
			cancer_oxygen_duplication_limit: 20.,
			cancer_duplication_chance: 0.1,
			cancer_duplication_oxygen_cost: 10.,
			capillary_growth_density_limit: 3,
			capillary_growth_fraction: 0.9,
			capillary_sprout_vegf_threshold: 10.,
			capillary_min_sprout_supply: 20.,
			capillary_sprout_chance: 0.1,
			deactivation_oxygen_limit: 10.,
			deactivation_base: 0.4,
			deactivation_oxygen_slope: 0.1,
		}
	}
}

#[cfg(feature = "python")]
#[pymethods]
impl TumorModel {
	/// `TumorModel(cancer_vegf_chance=0.2, ...)`; unnamed constants keep their defaults.
	#[new]
	#[args(kwargs = "**")]
	fn py_new(kwargs: Option<&pyo3::types::PyDict>) -> PyResult<Self> {
		let mut model = TumorModel::default();
		if let Some(kwargs) = kwargs {
			for (name, value) in kwargs.iter() {
				model
					.set(name.extract()?, value.extract()?)
					.map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
			}
		}
		Ok(model)
	}
}

impl TumorModel {
	/// Sets one rule constant by its field name, then re-validates the model.
	pub fn set(&mut self, name: &str, value: f64) -> Result<(), DishError> {
		let count = |value: f64| -> Result<u64, DishError> {
			if value >= 0. && value.fract() == 0. && value <= u32::MAX as f64 {
				Ok(value as u64)
			} else {
				Err(DishError::invalid(format!("{} must be a non-negative whole number", name)))
			}
		};
		let real = value as Real;
		let mut updated = self.clone();
		match name {
			"cell_oxygen_consumption" => updated.cell_oxygen_consumption = real,
			"max_oxygen_capacity" => updated.max_oxygen_capacity = real,
			"cell_deactivation_min_steps" => updated.cell_deactivation_min_steps = count(value)?,
			"normal_oxygen_consumption" => updated.normal_oxygen_consumption = real,
			"cancer_oxygen_consumption" => updated.cancer_oxygen_consumption = real,
			"cancer_oxygen_vegf_limit" => updated.cancer_oxygen_vegf_limit = real,
			"cancer_vegf_chance" => updated.cancer_vegf_chance = real,
			"cancer_vegf_supply" => updated.cancer_vegf_supply = real,
			"cancer_oxygen_duplication_limit" => updated.cancer_oxygen_duplication_limit = real,
			"cancer_duplication_chance" => updated.cancer_duplication_chance = real,
			"cancer_duplication_oxygen_cost" => updated.cancer_duplication_oxygen_cost = real,
			"capillary_growth_density_limit" => updated.capillary_growth_density_limit = count(value)? as usize,
			"capillary_growth_fraction" => updated.capillary_growth_fraction = real,
			"capillary_sprout_vegf_threshold" => updated.capillary_sprout_vegf_threshold = real,
			"capillary_min_sprout_supply" => updated.capillary_min_sprout_supply = real,
			"capillary_sprout_chance" => updated.capillary_sprout_chance = real,
			"deactivation_oxygen_limit" => updated.deactivation_oxygen_limit = real,
			"deactivation_base" => updated.deactivation_base = real,
			"deactivation_oxygen_slope" => updated.deactivation_oxygen_slope = real,
			_ => return Err(DishError::invalid(format!("unknown rule constant {}", name))),
		}
		updated.validate()?;
		*self = updated;
		Ok(())
	}

	pub fn validate(&self) -> Result<(), DishError> {
		if !(self.max_oxygen_capacity > 0.) {
			return Err(DishError::invalid("max_oxygen_capacity must be positive"));
		}
		let amounts = [
			("cell_oxygen_consumption", self.cell_oxygen_consumption),
			("normal_oxygen_consumption", self.normal_oxygen_consumption),
			("cancer_oxygen_consumption", self.cancer_oxygen_consumption),
			("cancer_vegf_supply", self.cancer_vegf_supply),
			("cancer_duplication_oxygen_cost", self.cancer_duplication_oxygen_cost),
		];
		for (name, value) in amounts {
			if !(value >= 0.) {
				return Err(DishError::invalid(format!("{} must be non-negative", name)));
			}
		}
		let chances = [
			("cancer_vegf_chance", self.cancer_vegf_chance),
			("cancer_duplication_chance", self.cancer_duplication_chance),
			("capillary_sprout_chance", self.capillary_sprout_chance),
		];
		for (name, value) in chances {
			if !(0. ..=1.).contains(&value) {
				return Err(DishError::invalid(format!("{} must lie in [0, 1]", name)));
			}
		}
		if !(self.capillary_growth_fraction > 0. && self.capillary_growth_fraction <= 1.) {
			return Err(DishError::invalid("capillary_growth_fraction must lie in (0, 1]"));
		}
		Ok(())
	}
}

/// Everything needed to seed a dish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DishConfig {
	pub width: usize,
	pub height: usize,
	/// Share of the free coordinates seeded with normal cells.
	pub proportion_normal: Real,
	/// Optional RNG seed for reproducible dishes.
	pub rng_seed: Option<u64>,
	pub model: TumorModel,
}

impl Default for DishConfig {
	fn default() -> Self {
		DishConfig { width: 20, height: 20, proportion_normal: 0.3, rng_seed: None, model: TumorModel::default() }
	}
}

impl DishConfig {
	pub fn validate(&self) -> Result<(), DishError> {
		if self.width == 0 || self.height == 0 {
			return Err(DishError::invalid("grid dimensions must be non-zero"));
		}
		if self.width < 2 {
			return Err(DishError::invalid("width must leave room beside the capillary column"));
		}
		if !(0. ..=1.).contains(&self.proportion_normal) {
			return Err(DishError::invalid("proportion_normal must lie in [0, 1]"));
		}
		self.model.validate()
	}
}
