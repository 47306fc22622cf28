use serde::{Deserialize, Serialize};

/// Metadata returned with every step.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Ticks applied so far in this episode, terminal no-op ticks excluded.
    pub step: usize,
    /// Slots that are alive or dead but not yet finalized.
    pub elegans_remaining: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EpisodeSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub steps: usize,
    /// True when the episode ended because every agent died, false when it hit `max_steps`.
    pub terminated: bool,
    /// Sum of rewards per agent slot.
    pub total_rewards: Vec<f32>,
    pub foods_eaten: usize,
    pub deaths: usize,
    pub final_elegans_remaining: usize,
}

impl EpisodeSummary {
    pub fn total_reward(&self) -> f32 {
        self.total_rewards.iter().sum()
    }
}

/// Aggregate over many episodes, as written by the batch runner.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub episodes: Vec<EpisodeSummary>,
    pub mean_steps: f32,
    pub mean_total_reward: f32,
    pub mean_foods_eaten: f32,
}

impl RunSummary {
    pub fn from_episodes(episodes: Vec<EpisodeSummary>) -> Self {
        let n = episodes.len().max(1) as f32;
        let mean_steps = episodes.iter().map(|e| e.steps as f32).sum::<f32>() / n;
        let mean_total_reward = episodes.iter().map(|e| e.total_reward()).sum::<f32>() / n;
        let mean_foods_eaten = episodes.iter().map(|e| e.foods_eaten as f32).sum::<f32>() / n;
        Self {
            schema_version: default_schema_version(),
            episodes,
            mean_steps,
            mean_total_reward,
            mean_foods_eaten,
        }
    }
}
