use crate::config::SimConfig;
use crate::field::{Frame, Observation};
use crate::metrics::EpisodeSummary;
use crate::world::{Directions, PerAgent, Simulation, SimulationError, StepOutcome};
use tracing::info;

/// Gym-style lifecycle around [`Simulation`]: seed, reset, step, render.
///
/// Episode `k` (counting resets from zero) runs with seed `base_seed + k`.
pub struct ElegansEnv {
    config: SimConfig,
    base_seed: u64,
    episode: u64,
    sim: Option<Simulation>,
}

impl ElegansEnv {
    pub fn new(config: SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            base_seed: config.seed,
            config,
            episode: 0,
            sim: None,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Base seed for the following resets; restarts the episode count.
    pub fn seed(&mut self, seed: u64) {
        self.base_seed = seed;
        self.episode = 0;
    }

    /// Resets started so far.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    /// Start a fresh episode and return its initial observations.
    pub fn reset(&mut self) -> Result<PerAgent<Observation>, SimulationError> {
        let seed = self.base_seed.wrapping_add(self.episode);
        let config = SimConfig {
            seed,
            ..self.config.clone()
        };
        let sim = Simulation::from_config(config)?;
        info!(
            episode = self.episode,
            seed,
            n_elegans = self.config.n_elegans,
            "episode reset"
        );
        self.episode += 1;
        let observations = sim.observations();
        self.sim = Some(sim);
        Ok(observations)
    }

    /// Swap in a new configuration and restart seeding from its `seed`, then
    /// reset. The old configuration is kept on failure.
    pub fn reset_with(
        &mut self,
        config: SimConfig,
    ) -> Result<PerAgent<Observation>, SimulationError> {
        config.validate()?;
        self.base_seed = config.seed;
        self.episode = 0;
        self.config = config;
        self.reset()
    }

    pub fn step(
        &mut self,
        directions: impl Into<Directions>,
    ) -> Result<StepOutcome, SimulationError> {
        self.sim
            .as_mut()
            .ok_or(SimulationError::EpisodeNotStarted)?
            .step(directions)
    }

    /// Snapshot of the current episode, `None` before the first reset.
    pub fn render_frame(&self) -> Option<Frame> {
        self.sim.as_ref().map(Simulation::render_frame)
    }

    /// Reset, then feed `policy` the latest observations until the episode
    /// ends or `max_steps` ticks have run.
    pub fn run_episode<F>(
        &mut self,
        max_steps: usize,
        mut policy: F,
    ) -> Result<EpisodeSummary, SimulationError>
    where
        F: FnMut(&PerAgent<Observation>) -> Directions,
    {
        let seed = self.base_seed.wrapping_add(self.episode);
        let mut observations = self.reset()?;
        let mut total_rewards = vec![0.0; self.config.n_elegans];
        let mut terminated = self.sim.as_ref().is_some_and(Simulation::is_done);
        let mut steps = 0;
        while !terminated && steps < max_steps {
            let outcome = self.step(policy(&observations))?;
            for (total, reward) in total_rewards.iter_mut().zip(outcome.rewards.as_slice()) {
                *total += reward;
            }
            observations = outcome.observations;
            terminated = outcome.done;
            steps += 1;
        }

        let sim = self.sim.as_ref().ok_or(SimulationError::EpisodeNotStarted)?;
        let summary = EpisodeSummary {
            schema_version: 1,
            seed,
            steps,
            terminated,
            total_rewards,
            foods_eaten: sim.foods_eaten(),
            deaths: sim.deaths(),
            final_elegans_remaining: sim.elegans_remaining(),
        };
        info!(
            seed,
            steps,
            terminated,
            total_reward = summary.total_reward(),
            "episode finished"
        );
        Ok(summary)
    }
}
