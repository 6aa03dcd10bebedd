//! Cellular-automaton model of tumor growth and angiogenesis on a 2-D lattice.
//!
//! Each tick every registered cell runs its rule in registration order:
//! oxygen and VEGF diffuse between Moore neighbors, starved cells may die,
//! cancer cells duplicate into empty space and capillaries sprout towards
//! high VEGF.

mod cell;
mod dish;
mod error;
mod grid;
mod metrics;
mod model;
#[cfg(feature = "python")]
mod python;
mod rng;
mod rules;
mod schedule;
mod tissue;

pub use cell::{Cell, CellKind, CellType};
pub use dish::PetriDish;
pub use error::DishError;
pub use grid::{Coord, Grid};
pub use metrics::{oxygen_histogram, series_line, CellCounts, CellSnapshot, DishSnapshot};
pub use model::{DishConfig, TumorModel};
pub use rng::{FixedRoll, RollSource};
pub use schedule::Schedule;
pub use tissue::CellId;

pub type Real = f32;
