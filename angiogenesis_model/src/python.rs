use ndarray::{Array1, Array2};
use numpy::{PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::{DishConfig, PetriDish, Real, TumorModel};

/// Runs a dish for `ticks` steps and returns the final cells as
/// `(positions, types, oxygen, vegf)`, in registration order.
#[pyfunction]
fn run<'py>(
	py: Python<'py>,
	model: TumorModel,
	width: usize,
	height: usize,
	proportion_normal: Real,
	ticks: u64,
	seed: Option<u64>,
) -> PyResult<(&'py PyArray2<i64>, &'py PyArray1<i32>, &'py PyArray1<Real>, &'py PyArray1<Real>)> {
	let config = DishConfig { width, height, proportion_normal, rng_seed: seed, model };
	let mut dish = PetriDish::new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
	dish.run(ticks).map_err(|e| PyValueError::new_err(e.to_string()))?;

	let n_cells = dish.len();
	let mut cell_positions = Array2::<i64>::zeros((n_cells, 2));
	let mut cell_types = Array1::<i32>::zeros(n_cells);
	let mut oxygen = Array1::<Real>::zeros(n_cells);
	let mut vegf = Array1::<Real>::zeros(n_cells);
	for (i, c) in dish.cells().enumerate() {
		cell_positions[[i, 0]] = c.position().x as i64;
		cell_positions[[i, 1]] = c.position().y as i64;
		cell_types[[i]] = c.cell_type() as i32;
		oxygen[[i]] = c.oxygen();
		vegf[[i]] = c.vegf();
	}
	Ok((
		numpy::PyArray::from_array(py, &cell_positions),
		numpy::PyArray::from_array(py, &cell_types),
		numpy::PyArray::from_array(py, &oxygen),
		numpy::PyArray::from_array(py, &vegf),
	))
}

#[pymodule]
fn angiogenesis_model(_py: Python, m: &PyModule) -> PyResult<()> {
	m.add_class::<TumorModel>()?;
	m.add_function(wrap_pyfunction!(run, m)?)?;
	Ok(())
}
