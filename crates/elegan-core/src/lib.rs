//! Multi-agent c-elegan grid world.
//!
//! Agents crawl over a bounded grid, turning left, right or going straight
//! each tick. Food radiates an inverse-square scent over the whole grid and
//! each agent observes the scent one cell to its left and right. Eating grows
//! the body, leaving the grid kills the agent.
//!
//! ```rust
//! use elegan_core::{ElegansEnv, SimConfig};
//!
//! let mut env = ElegansEnv::new(SimConfig::default()).unwrap();
//! let _obs = env.reset().unwrap();
//! let outcome = env.step(1).unwrap();
//! assert_eq!(outcome.info.elegans_remaining, 1);
//! ```

pub mod agent;
pub mod config;
pub mod constants;
pub mod env;
pub mod field;
pub mod metrics;
pub mod rng;
pub mod world;

pub use agent::{Coord, Elegan, Heading, InvalidDirection};
pub use config::{SimConfig, SimConfigError};
pub use env::ElegansEnv;
pub use field::{Frame, Observation, SpatialField};
pub use metrics::{EpisodeSummary, RunSummary, StepInfo};
pub use world::{AgentSlot, Directions, PerAgent, Simulation, SimulationError, StepOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
