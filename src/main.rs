use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zombie_spread::{
    config::SpreadConfig, generators, simulation::Simulation, topology::TopologyKind, City, Rule,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GraphKind {
    /// Random lobster with extra random shortcuts
    Lobster,
    /// Watts-Strogatz small world
    WattsStrogatz,
}

/// Zombie outbreak simulator
#[derive(Parser, Debug)]
#[command(name = "zombie-spread")]
#[command(about = "Simulate a zombie outbreak spreading over a graph")]
#[command(version)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color changing rule (target_set_selection, stochastic, deterministic)
    #[arg(short, long)]
    rule: Option<String>,

    /// Number of days to simulate
    #[arg(short, long)]
    timesteps: Option<u32>,

    /// Chance that a citizen starts as a zombie
    #[arg(short = 'p', long)]
    initial_probability: Option<f64>,

    /// Seed for the outbreak
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where the frame directories go
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Drop roads between zombies between timesteps with this probability
    #[arg(long)]
    drop_probability: Option<f64>,

    /// Apply the topology policy between timesteps
    #[arg(long)]
    update_topology: bool,

    /// Do not write frames
    #[arg(long)]
    no_save: bool,

    /// Print every frame to the terminal
    #[arg(long)]
    show: bool,

    /// Do not assemble a GIF
    #[arg(long)]
    no_animate: bool,

    /// City to simulate on
    #[arg(short, long, value_enum, default_value = "lobster")]
    graph: GraphKind,

    /// Size parameter of the generated city
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Random shortcuts tried on top of the lobster
    #[arg(long, default_value = "25")]
    shortcuts: usize,

    /// Seed for the city generator
    #[arg(long, default_value = "10")]
    graph_seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<SpreadConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => SpreadConfig::load(path)?,
            None => SpreadConfig::default(),
        };
        if let Some(rule) = &self.rule {
            config.rule = rule.parse::<Rule>()?;
        }
        if let Some(timesteps) = self.timesteps {
            config.timesteps = timesteps;
        }
        if let Some(p) = self.initial_probability {
            config.initial_probability = p;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(probability) = self.drop_probability {
            config.topology = TopologyKind::DropInfectedEdges { probability };
        }
        config.update_topology |= self.update_topology;
        config.save_frames &= !self.no_save;
        config.show_frames |= self.show;
        config.animate &= !self.no_animate;
        config.validate()?;
        Ok(config)
    }
}

fn build_city(args: &Args) -> zombie_spread::Result<City> {
    let mut rng = StdRng::seed_from_u64(args.graph_seed);
    match args.graph {
        GraphKind::Lobster => {
            let n = args.nodes.unwrap_or(25);
            let mut city = generators::random_lobster(n, 0.8, 0.8, &mut rng)?;
            let built = generators::add_random_edges(&mut city, args.shortcuts, &mut rng);
            debug!(tried = args.shortcuts, built, "random shortcuts added");
            Ok(city)
        }
        GraphKind::WattsStrogatz => {
            generators::watts_strogatz(args.nodes.unwrap_or(50), 6, 0.1, &mut rng)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(true)
        .init();

    let city = build_city(&args)?;
    let graph = args.graph;
    let config = args.into_config()?;
    info!(
        ?graph,
        citizens = city.citizen_count(),
        roads = city.road_count(),
        "city built"
    );

    let mut simulation = Simulation::builder(config).build()?;
    let frame_dir = simulation.config().frame_dir();
    info!(frames = %frame_dir.display(), "frame directory");
    let report = simulation.run(city)?;
    if let Some(path) = &report.animation {
        info!(path = %path.display(), "animation saved");
    }
    info!(history = ?report.history, "zombies per day");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_do_not_follow_node_count() {
        let args = Args::try_parse_from(["zombie-spread", "--nodes", "40"]).unwrap();
        assert_eq!(args.shortcuts, 25);
        assert_eq!(args.nodes, Some(40));
    }

    #[test]
    fn lobster_without_shortcuts_stays_a_tree() {
        let args = Args::try_parse_from(["zombie-spread", "--shortcuts", "0"]).unwrap();
        let city = build_city(&args).unwrap();
        if city.citizen_count() > 0 {
            assert_eq!(city.road_count() + 1, city.citizen_count());
        }
    }
}
