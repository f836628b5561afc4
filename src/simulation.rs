use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::{
    animate::{Animator, GifAnimator},
    city::City,
    config::SpreadConfig,
    error::{Result, SpreadError},
    layout::{ForceLayout, Layout, LayoutEngine},
    render::{BitmapVisualizer, Visualizer},
    spread::{initialize, next_state, SeedSet},
    topology::TopologyPolicy,
};

/// Where a simulation is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// Working on timestep `t`.
    Running { t: u32 },
    Done,
}

/// Outcome of a finished run.
#[derive(Debug)]
pub struct SpreadReport {
    /// City after the last rule evaluation.
    pub city: City,
    /// Zombie count after initialization, then after every timestep.
    pub history: Vec<usize>,
    /// Saved frames in the order they were drawn.
    pub frames: Vec<PathBuf>,
    pub animation: Option<PathBuf>,
}

/// Seeds the city, fixes a layout, then for every timestep draws the city,
/// optionally reshapes the roads and applies the rule once.
/// Any error ends the run.
pub struct Simulation {
    config: SpreadConfig,
    seeds: SeedSet,
    layout_engine: Box<dyn LayoutEngine>,
    visualizer: Box<dyn Visualizer>,
    animator: Box<dyn Animator>,
    topology: Box<dyn TopologyPolicy>,
    rng: StdRng,
    phase: Phase,
}

impl Simulation {
    pub fn builder(config: SpreadConfig) -> SimulationBuilder {
        SimulationBuilder::new(config)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Runs the whole outbreak on `city`. A simulation runs once.
    pub fn run(&mut self, mut city: City) -> Result<SpreadReport> {
        if self.phase != Phase::Uninitialized {
            return Err(SpreadError::invalid("simulation", "has already been run"));
        }

        let rule = self.config.rule;
        info!(
            citizens = city.citizen_count(),
            roads = city.road_count(),
            %rule,
            timesteps = self.config.timesteps,
            update_topology = self.config.update_topology,
            "starting outbreak"
        );

        initialize(&mut city, &self.seeds, &mut self.rng)?;
        let layout = self.layout_engine.layout(&city, &mut self.rng)?;

        let frame_dir = self.config.frame_dir();
        if self.config.save_frames {
            fs::create_dir_all(&frame_dir)?;
        }

        let mut history = vec![city.zombie_count()];
        let mut frames = vec![];

        for t in 0..self.config.timesteps {
            self.phase = Phase::Running { t };

            self.visualize(&city, &layout, &frame_dir, &format!("zombies-{t}"), &mut frames)?;

            if self.config.update_topology {
                city = self.topology.update(&city, &mut self.rng)?;
                self.visualize(
                    &city,
                    &layout,
                    &frame_dir,
                    &format!("zombies-{t}-edges"),
                    &mut frames,
                )?;
            }

            city = next_state(&city, rule, &mut self.rng)?;
            history.push(city.zombie_count());
            debug!(t, zombies = city.zombie_count(), roads = city.road_count(), "timestep done");
        }
        self.phase = Phase::Done;

        let animation = if self.config.animate && self.config.save_frames && !frames.is_empty() {
            Some(self.animator.animate(&frames, &frame_dir)?)
        } else {
            None
        };

        info!(
            zombies = city.zombie_count(),
            citizens = city.citizen_count(),
            frames = frames.len(),
            "outbreak finished"
        );

        Ok(SpreadReport {
            city,
            history,
            frames,
            animation,
        })
    }

    fn visualize(
        &mut self,
        city: &City,
        layout: &Layout,
        dir: &Path,
        name: &str,
        frames: &mut Vec<PathBuf>,
    ) -> Result<()> {
        if self.config.save_frames {
            let target = dir.join(format!("{name}.png"));
            if let Some(path) = self.visualizer.draw(city, layout, Some(target.as_path()))? {
                frames.push(path);
            }
        }
        if self.config.show_frames {
            self.visualizer.draw(city, layout, None)?;
        }
        Ok(())
    }
}

/// Builder for `Simulation`.
/// Collaborators not set explicitly fall back to the bundled ones.
pub struct SimulationBuilder {
    config: SpreadConfig,
    seeds: Option<SeedSet>,
    layout_engine: Option<Box<dyn LayoutEngine>>,
    visualizer: Option<Box<dyn Visualizer>>,
    animator: Option<Box<dyn Animator>>,
    topology: Option<Box<dyn TopologyPolicy>>,
}

impl SimulationBuilder {
    pub fn new(config: SpreadConfig) -> Self {
        Self {
            config,
            seeds: None,
            layout_engine: None,
            visualizer: None,
            animator: None,
            topology: None,
        }
    }

    /// Overrides the Bernoulli seeding taken from the config.
    pub fn seeds(mut self, seeds: impl Into<SeedSet>) -> Self {
        self.seeds = Some(seeds.into());
        self
    }

    pub fn layout_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.layout_engine = Some(Box::new(engine));
        self
    }

    pub fn visualizer(mut self, visualizer: impl Visualizer + 'static) -> Self {
        self.visualizer = Some(Box::new(visualizer));
        self
    }

    pub fn animator(mut self, animator: impl Animator + 'static) -> Self {
        self.animator = Some(Box::new(animator));
        self
    }

    /// Overrides the policy named by the config's `topology` field.
    pub fn topology_policy(mut self, policy: impl TopologyPolicy + 'static) -> Self {
        self.topology = Some(Box::new(policy));
        self
    }

    /// Validates the config and constructs a instance of `Simulation`
    pub fn build(self) -> Result<Simulation> {
        let config = self.config;
        config.validate()?;

        let topology = match self.topology {
            Some(policy) => policy,
            None => config.topology.build()?,
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (width, height) = config.frame_size;

        Ok(Simulation {
            seeds: self
                .seeds
                .unwrap_or(SeedSet::Probability(config.initial_probability)),
            layout_engine: self.layout_engine.unwrap_or_else(|| {
                Box::new(
                    ForceLayout::builder()
                        .iterations(config.layout_iterations)
                        .build(),
                )
            }),
            visualizer: self
                .visualizer
                .unwrap_or_else(|| Box::new(BitmapVisualizer::new(width, height))),
            animator: self
                .animator
                .unwrap_or_else(|| Box::new(GifAnimator::default())),
            topology,
            rng,
            phase: Phase::Uninitialized,
            config,
        })
    }
}
