use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use geocluster::cluster::{ClusterRun, ClusteringConfig, ClusteringEngine};
use geocluster::world::{EntityCategory, EntityId, World};

/// Largest grid side accepted; keeps `side * side` ids well inside `u32`.
const MAX_SIDE: u32 = 1024;

/// Parses the positional argument at `position`, falling back to `default`
/// when it is absent.
fn arg<T: std::str::FromStr>(args: &[String], position: usize, name: &str, default: T) -> T {
    match args.get(position) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("invalid {name}: {raw:?}");
            std::process::exit(2);
        }),
    }
}

/// Usage: grid_clusters [side] [k] [seed]
fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let side = arg::<u32>(&args, 0, "side", 12).clamp(1, MAX_SIDE);
    let k = arg::<usize>(&args, 1, "k", 5).clamp(1, (side * side) as usize);
    let seed = arg::<u64>(&args, 2, "seed", 7);

    // scatter a few agents of each kind over the map
    let mut world = World::grid(side, side, 100.0);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut next_id = side * side + 1;
    for category in EntityCategory::AGENTS {
        for _ in 0..k {
            let area = EntityId(rng.gen_range(1..=side * side));
            world.add_on(EntityId(next_id), category, area);
            next_id += 1;
        }
    }

    let config = ClusteringConfig::new(k).with_seed(seed);
    let engine = match ClusteringEngine::new(&world, config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("cannot build engine: {err}");
            std::process::exit(1);
        }
    };

    for (label, run) in [("precompute", engine.precompute()), ("refine", engine.refine())] {
        match run {
            Ok(run) => print_run(label, &run),
            Err(err) => {
                eprintln!("{label} failed: {err}");
                std::process::exit(1);
            }
        }
    }
}

fn print_run(label: &str, run: &ClusterRun) {
    println!(
        "=== {label}: {} metric, {:?} after {} iterations ===",
        run.metric, run.termination, run.iterations
    );
    for cluster in run.state.clusters() {
        println!(
            "cluster {} | center {} | size {}",
            cluster.index() + 1,
            cluster.center(),
            cluster.len()
        );
    }
}
