use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use angiogenesis_model::{DishConfig, PetriDish, Real, RollSource};

/// Grows a tumor in a petri dish and records cancer/capillary counts per tick.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
	/// JSON file with a `DishConfig`; flags below override its fields.
	#[arg(long)]
	config: Option<PathBuf>,
	#[arg(long)]
	width: Option<usize>,
	#[arg(long)]
	height: Option<usize>,
	#[arg(long)]
	proportion_normal: Option<Real>,
	#[arg(long)]
	seed: Option<u64>,
	/// Number of ticks to simulate.
	#[arg(long, default_value_t = 200)]
	ticks: u64,
	/// Series file, one `<tick> <cancer> <capillary>` line appended for the
	/// seeded dish and one after every tick, so `--ticks N` adds N + 1 lines.
	#[arg(long, default_value = "data.txt")]
	series: PathBuf,
	/// Where to write the final snapshot as JSON.
	#[arg(long)]
	snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
	init_tracing();
	let args = Args::parse();
	let config = load_config(&args)?;

	let mut dish = PetriDish::new(config).context("failed to seed petri dish")?;
	let series = OpenOptions::new()
		.create(true)
		.append(true)
		.open(&args.series)
		.with_context(|| format!("failed to open series file {}", args.series.display()))?;
	let mut series = BufWriter::new(series);
	simulate(&mut dish, args.ticks, &mut series)?;
	series.flush()?;

	if let Some(path) = &args.snapshot {
		let json = dish.snapshot().to_json()?;
		fs::write(path, json).with_context(|| format!("failed to write snapshot {}", path.display()))?;
	}
	Ok(())
}

/// Steps the dish up to tick `ticks`, writing a series line for the starting
/// state and after each step.
fn simulate<R: RollSource, W: Write>(dish: &mut PetriDish<R>, ticks: u64, series: &mut W) -> Result<()> {
	loop {
		let counts = dish.counts();
		writeln!(series, "{}", angiogenesis_model::series_line(dish.tick(), &counts))?;
		info!(
			tick = dish.tick(),
			normal = counts.normal,
			cancer = counts.cancer,
			capillary = counts.capillary,
			"Number of cells"
		);
		if dish.tick() >= ticks {
			return Ok(());
		}
		dish.step().with_context(|| format!("tick {} failed", dish.tick()))?;
	}
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init();
}

fn load_config(args: &Args) -> Result<DishConfig> {
	let mut config = match &args.config {
		Some(path) => {
			let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
			serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?
		}
		None => DishConfig::default(),
	};
	if let Some(width) = args.width {
		config.width = width;
	}
	if let Some(height) = args.height {
		config.height = height;
	}
	if let Some(proportion_normal) = args.proportion_normal {
		config.proportion_normal = proportion_normal;
	}
	if args.seed.is_some() {
		config.rng_seed = args.seed;
	}
	Ok(config)
}
