use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{check_probability, Result, SpreadError},
    spread::Rule,
    topology::TopologyKind,
};

/// Everything the driver needs to know about a run.
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadConfig {
    /// Number of days to simulate.
    pub timesteps: u32,
    /// Color changing rule.
    pub rule: Rule,
    /// Apply the topology policy between timesteps.
    pub update_topology: bool,
    /// Persist every frame as a PNG.
    pub save_frames: bool,
    /// Print every frame to the terminal.
    pub show_frames: bool,
    /// Combine saved frames into a GIF at the end of the run.
    pub animate: bool,
    /// Chance that a citizen starts as a zombie.
    pub initial_probability: f64,
    /// Seed for every random draw of the run. Random when absent.
    pub seed: Option<u64>,
    /// Root under which `{rule}/{static|dynamic}` frame directories go.
    pub output_dir: PathBuf,
    /// Policy used when `update_topology` is set.
    pub topology: TopologyKind,
    /// Frame size in pixels.
    pub frame_size: (u32, u32),
    /// Steps of the force directed layout.
    pub layout_iterations: usize,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            timesteps: 10,
            rule: Rule::TargetSetSelection,
            update_topology: false,
            save_frames: true,
            show_frames: false,
            animate: true,
            initial_probability: 0.3,
            seed: None,
            output_dir: PathBuf::from("."),
            topology: TopologyKind::None,
            frame_size: (1000, 1000),
            layout_iterations: 500,
        }
    }
}

impl SpreadConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: SpreadConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timesteps == 0 {
            return Err(SpreadError::invalid("timesteps", "must be positive"));
        }
        check_probability("initial_probability", self.initial_probability)?;
        if let TopologyKind::DropInfectedEdges { probability } = self.topology {
            check_probability("drop_probability", probability)?;
        }
        if self.frame_size.0 == 0 || self.frame_size.1 == 0 {
            return Err(SpreadError::invalid("frame_size", "must be non-zero"));
        }
        Ok(())
    }

    /// Directory frames and the animation go to.
    pub fn frame_dir(&self) -> PathBuf {
        let variant = if self.update_topology {
            "dynamic"
        } else {
            "static"
        };
        self.output_dir.join(self.rule.name()).join(variant)
    }
}
