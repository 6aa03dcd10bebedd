use angiogenesis_model::{
	Cell, CellKind, CellType, Coord, DishConfig, DishSnapshot, FixedRoll, PetriDish, TumorModel,
};
use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn seeded(width: usize, height: usize, seed: u64) -> PetriDish<Pcg64> {
	let config = DishConfig { width, height, rng_seed: Some(seed), ..DishConfig::default() };
	PetriDish::new(config).unwrap()
}

fn lone_cancer_dish(model: TumorModel) -> PetriDish<FixedRoll> {
	PetriDish::from_layout(model, 3, 3, FixedRoll(0.), |c| match (c.x, c.y) {
		(1, 1) => Cell::cancer(false).with_oxygen(50.),
		(2, 2) => Cell::capillary(100.),
		_ => Cell::empty(),
	})
	.unwrap()
}

#[test]
fn cancer_fills_affordable_neighbors_and_capillary_feeds_its_own() {
	let mut dish = lone_cancer_dish(TumorModel::default());
	dish.step().unwrap();

	// 50 - 10 upkeep leaves room for two duplications at 10 each before
	// dropping to the duplication limit of 20
	assert_eq!(dish.count_cells(CellType::Cancer), 3);
	assert_eq!(dish.count_cells(CellType::Capillary), 1);
	assert_eq!(dish.count_cells(CellType::Empty), 5);
	for coord in [Coord::new(0, 0), Coord::new(1, 0)] {
		let cell = dish.cell_at(coord).unwrap();
		assert_eq!(cell.kind(), CellKind::Cancer { vegf_mutated: false });
		// created this tick, not yet visited
		assert_eq!(cell.age_in_steps(), 0);
	}

	let max = dish.model().max_oxygen_capacity;
	for coord in [Coord::new(1, 1), Coord::new(2, 1), Coord::new(1, 2)] {
		assert_relative_eq!(dish.cell_at(coord).unwrap().oxygen(), max);
	}
	assert_relative_eq!(dish.cell_at(Coord::new(2, 2)).unwrap().oxygen(), 100.);

	let order: Vec<_> = dish.cells().map(|c| c.position()).collect();
	assert_eq!(&order[order.len() - 2..], &[Coord::new(0, 0), Coord::new(1, 0)]);
	dish.check_occupancy().unwrap();
}

#[test]
fn free_duplication_fills_every_empty_neighbor_in_one_tick() {
	let model = TumorModel { cancer_duplication_oxygen_cost: 0., ..TumorModel::default() };
	let mut dish = lone_cancer_dish(model);
	dish.step().unwrap();

	assert_eq!(dish.count_cells(CellType::Cancer), 8);
	assert_eq!(dish.count_cells(CellType::Empty), 0);
	assert!(dish.cells().filter(|c| c.is(CellType::Cancer)).all(|c| !c.vegf_mutated()));
}

#[test]
fn offspring_in_later_slots_wait_for_the_next_tick() {
	// (2, 1) is registered after the cancer at (1, 1) and is its only empty neighbor
	let mut dish = PetriDish::from_layout(TumorModel::default(), 3, 3, FixedRoll(0.), |c| match (c.x, c.y) {
		(1, 1) => Cell::cancer(false).with_oxygen(50.),
		(2, 1) => Cell::empty(),
		_ => Cell::normal(),
	})
	.unwrap();
	dish.step().unwrap();

	assert_eq!(dish.count_cells(CellType::Cancer), 2);
	assert_eq!(dish.count_cells(CellType::Empty), 0);
	let offspring = dish.cell_at(Coord::new(2, 1)).unwrap();
	assert!(offspring.is(CellType::Cancer));
	assert_eq!(offspring.age_in_steps(), 0);
	assert_eq!(dish.cells().last().unwrap().position(), Coord::new(2, 1));
	// the normal cell registered after the replaced slot still ran
	assert_eq!(dish.cell_at(Coord::new(2, 2)).unwrap().age_in_steps(), 1);

	dish.step().unwrap();
	assert_eq!(dish.cell_at(Coord::new(2, 1)).unwrap().age_in_steps(), 1);
	dish.check_occupancy().unwrap();
}

#[test]
fn starved_cell_becomes_empty_in_place() {
	let mut dish = PetriDish::from_layout(TumorModel::default(), 1, 1, FixedRoll(0.99), |_| {
		Cell::normal().with_age(TumorModel::default().cell_deactivation_min_steps + 5)
	})
	.unwrap();
	dish.step().unwrap();

	assert_eq!(dish.len(), 1);
	let cell = dish.cell_at(Coord::new(0, 0)).unwrap();
	assert!(cell.is(CellType::Empty));
	assert_eq!(cell.age_in_steps(), 0);
	assert_eq!(dish.counts(), dish.recount());
}

#[test]
fn empty_cells_never_die() {
	let mut dish = PetriDish::from_layout(TumorModel::default(), 4, 4, FixedRoll(0.99), |_| {
		Cell::empty().with_age(1_000)
	})
	.unwrap();
	dish.run(5).unwrap();

	assert_eq!(dish.count_cells(CellType::Empty), 16);
	assert!(dish.cells().all(|c| c.age_in_steps() == 1_005));
}

#[test]
fn weak_capillaries_never_sprout() {
	let mut dish = PetriDish::from_layout(TumorModel::default(), 3, 3, FixedRoll(0.), |c| {
		if c == Coord::new(1, 1) {
			Cell::capillary(20.)
		} else {
			Cell::empty().with_vegf(500.)
		}
	})
	.unwrap();
	dish.run(10).unwrap();
	assert_eq!(dish.count_cells(CellType::Capillary), 1);
	assert_eq!(dish.count_cells(CellType::Empty), 8);
}

#[test]
fn diffusion_conserves_oxygen_between_partners() {
	let model = TumorModel { cell_oxygen_consumption: 0., ..TumorModel::default() };
	let mut dish = PetriDish::from_layout(model, 2, 1, FixedRoll(0.), |c| {
		if c.x == 0 {
			Cell::empty().with_oxygen(60.)
		} else {
			Cell::empty()
		}
	})
	.unwrap();
	dish.step().unwrap();

	let donor = dish.cell_at(Coord::new(0, 0)).unwrap().oxygen();
	let recipient = dish.cell_at(Coord::new(1, 0)).unwrap().oxygen();
	assert_relative_eq!(donor, 40.);
	assert_relative_eq!(recipient, 20.);
	assert_relative_eq!(donor + recipient, 60.);
}

#[test]
fn levels_and_occupancy_hold_every_tick() {
	let mut dish = seeded(30, 30, 11);
	let max = dish.model().max_oxygen_capacity;
	for _ in 0..150 {
		dish.check_occupancy().unwrap();
		assert_eq!(dish.len(), 900);
		assert_eq!(dish.counts(), dish.recount());
		for cell in dish.cells() {
			assert!(cell.oxygen() >= 0. && cell.oxygen() <= max, "oxygen {} out of range", cell.oxygen());
			assert!(cell.vegf() >= 0., "negative vegf {}", cell.vegf());
		}
		dish.step().unwrap();
	}
	dish.check_occupancy().unwrap();
}

#[test]
fn same_seed_replays_bit_for_bit() {
	let mut a = seeded(25, 25, 42);
	let mut b = PetriDish::with_rng(
		DishConfig { width: 25, height: 25, ..DishConfig::default() },
		Pcg64::seed_from_u64(42),
	)
	.unwrap();
	a.run(80).unwrap();
	b.run(80).unwrap();

	let fingerprint = |dish: &PetriDish<Pcg64>| -> Vec<(Coord, CellType, u32, u32)> {
		dish.cells().map(|c| (c.position(), c.cell_type(), c.oxygen().to_bits(), c.vegf().to_bits())).collect()
	};
	assert_eq!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn snapshot_round_trip_matches_scan() {
	let mut dish = seeded(20, 20, 5);
	dish.run(40).unwrap();

	let snapshot = dish.snapshot();
	let restored = DishSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
	let layout = |s: &DishSnapshot| s.cells.iter().map(|c| (c.position, c.kind)).collect::<Vec<_>>();
	assert_eq!(layout(&restored), layout(&snapshot));
	assert_eq!(restored.counts, restored.recount());
	assert_eq!(restored.counts, dish.recount());
	assert_eq!(restored.tick, 40);
	assert_eq!(
		restored.series_line(),
		format!("40 {} {}", dish.count_cells(CellType::Cancer), dish.count_cells(CellType::Capillary))
	);
}
