use crate::error::DishError;

/// Insertion ordered registry of live cells.
///
/// Removal keeps the relative order of the remaining entries, and anything
/// added afterwards lands at the end, so a replaced cell moves to the back
/// of the visiting order.
#[derive(Clone, Debug)]
pub struct Schedule<K> {
	order: Vec<K>,
}

impl<K: Copy + PartialEq> Schedule<K> {
	pub fn new() -> Self {
		Schedule { order: Vec::new() }
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Schedule { order: Vec::with_capacity(capacity) }
	}

	pub fn add(&mut self, key: K) {
		self.order.push(key);
	}

	pub fn remove(&mut self, key: K) -> Result<(), DishError> {
		let index = self.order.iter().position(|&k| k == key).ok_or(DishError::NotScheduled)?;
		self.order.remove(index);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn contains(&self, key: K) -> bool {
		self.order.contains(&key)
	}

	pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
		self.order.iter().copied()
	}

	/// Visiting order for the tick about to run.
	pub(crate) fn snapshot(&self) -> Vec<K> {
		self.order.clone()
	}
}

impl<K: Copy + PartialEq> Default for Schedule<K> {
	fn default() -> Self {
		Self::new()
	}
}
