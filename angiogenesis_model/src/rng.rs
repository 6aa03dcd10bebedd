use rand::{Rng, RngCore};
use rand_distr::{Distribution, Standard};

use crate::Real;

/// Stream of uniform draws consumed by the cell rules.
///
/// Every stochastic decision in a tick pulls from one source in a fixed call
/// order, so replaying the same seed replays the same dish.
pub trait RollSource {
	/// Uniform draw in `[0, 1)`.
	fn roll(&mut self) -> Real;

	/// Uniform index in `0..n`. `n` must be non-zero.
	fn pick(&mut self, n: usize) -> usize;
}

impl<R: RngCore> RollSource for R {
	fn roll(&mut self) -> Real {
		Standard.sample(self)
	}

	fn pick(&mut self, n: usize) -> usize {
		self.gen_range(0..n)
	}
}

/// Source that returns the same roll forever. Used to force rule outcomes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedRoll(pub Real);

impl RollSource for FixedRoll {
	fn roll(&mut self) -> Real {
		self.0
	}

	fn pick(&mut self, n: usize) -> usize {
		((self.0 * n as Real) as usize).min(n.saturating_sub(1))
	}
}
