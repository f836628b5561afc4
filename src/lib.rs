//! # Example
//! ```rust,no_run
//! use zombie_spread::{config::SpreadConfig, generators, simulation::Simulation, spread::Rule};
//!
//! let city = generators::cycle(20);
//! let config = SpreadConfig {
//!     rule: Rule::Stochastic,
//!     timesteps: 5,
//!     ..SpreadConfig::default()
//! };
//! let report = Simulation::builder(config).build()?.run(city)?;
//! println!("{} zombies", report.city.zombie_count());
//! # Ok::<(), zombie_spread::error::SpreadError>(())
//! ```

pub mod animate;
pub mod city;
pub mod config;
pub mod error;
pub mod generators;
pub mod layout;
pub mod quadtree;
pub mod render;
pub mod simulation;
pub mod spread;
pub mod topology;

pub use city::{Citizen, City};
pub use error::{Result, SpreadError};
pub use simulation::{Simulation, SimulationBuilder, SpreadReport};
pub use spread::{Rule, SeedSet};
