use crate::agent::{Coord, Elegan};
use crate::config::{SimConfig, SimConfigError};
use crate::constants::{ELEGAN_COLOR, START_ROW};
use crate::field::{Frame, Observation, SpatialField};
use crate::metrics::StepInfo;
use crate::rng::create_rng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

/// Lifecycle of one index-stable agent position.
///
/// A fatal move turns `Live` into `DeadPending`; the next tick that visits the
/// slot finalizes it to `Removed` and only then is the agent uncounted.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentSlot {
    Live(Elegan),
    DeadPending(Elegan),
    Removed,
}

impl AgentSlot {
    pub fn live(&self) -> Option<&Elegan> {
        match self {
            AgentSlot::Live(elegan) => Some(elegan),
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, AgentSlot::Live(_))
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, AgentSlot::Removed)
    }
}

/// Relative turns for one tick: 0 left, 1 straight, 2 right (any integer is collapsed mod 3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directions {
    Single(i64),
    Multi(Vec<i64>),
}

impl Directions {
    pub fn into_vec(self) -> Vec<i64> {
        match self {
            Directions::Single(turn) => vec![turn],
            Directions::Multi(turns) => turns,
        }
    }
}

impl From<i64> for Directions {
    fn from(turn: i64) -> Self {
        Directions::Single(turn)
    }
}

impl From<Vec<i64>> for Directions {
    fn from(turns: Vec<i64>) -> Self {
        Directions::Multi(turns)
    }
}

impl From<&[i64]> for Directions {
    fn from(turns: &[i64]) -> Self {
        Directions::Multi(turns.to_vec())
    }
}

/// Per-agent values shaped like the episode: a bare value for a single-agent
/// episode, one entry per slot otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum PerAgent<T> {
    Single(T),
    Multi(Vec<T>),
}

impl<T> PerAgent<T> {
    /// Exactly one value becomes `Single`; any other count becomes `Multi`.
    pub fn from_vec(mut values: Vec<T>) -> Self {
        if values.len() == 1 {
            if let Some(value) = values.pop() {
                return PerAgent::Single(value);
            }
        }
        PerAgent::Multi(values)
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            PerAgent::Single(value) => std::slice::from_ref(value),
            PerAgent::Multi(values) => values,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            PerAgent::Single(value) => vec![value],
            PerAgent::Multi(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.as_slice().get(idx)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observations: PerAgent<Observation>,
    pub rewards: PerAgent<f32>,
    pub done: bool,
    pub info: StepInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(SimConfigError),
    MalformedInput { expected: usize, actual: usize },
    EpisodeNotStarted,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "invalid configuration: {e}"),
            SimulationError::MalformedInput { expected, actual } => write!(
                f,
                "expected a direction for each of the {expected} agent slots, got {actual}"
            ),
            SimulationError::EpisodeNotStarted => {
                write!(f, "no episode in progress; call reset first")
            }
        }
    }
}

impl From<SimConfigError> for SimulationError {
    fn from(err: SimConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// One episode: the scent field, the agent slots, and the RNG that places food.
pub struct Simulation {
    slots: Vec<AgentSlot>,
    field: SpatialField,
    config: SimConfig,
    rng: ChaCha12Rng,
    elegans_remaining: usize,
    step_index: usize,
    foods_eaten: usize,
    deaths: usize,
}

impl Simulation {
    /// Validate `config`, spawn the agents and place the initial food using `rng`.
    pub fn new(config: SimConfig, rng: ChaCha12Rng) -> Result<Self, SimulationError> {
        config.validate()?;
        let n = config.n_elegans;
        let slots = (1..=n)
            .map(|i| {
                let column = (i * config.grid_width / (n + 1)) as i32;
                AgentSlot::Live(Elegan::new([column, START_ROW], ELEGAN_COLOR * i as f32))
            })
            .collect();
        let field = SpatialField::new(
            config.grid_width,
            config.grid_height,
            config.unit_size,
            config.unit_gap,
        );
        let mut sim = Self {
            slots,
            field,
            config,
            rng,
            elegans_remaining: n,
            step_index: 0,
            foods_eaten: 0,
            deaths: 0,
        };
        for _ in 0..sim.config.n_foods {
            // Stop at the first miss, the grid is full.
            if sim.place_food().is_none() {
                break;
            }
        }
        Ok(sim)
    }

    /// Same as [`Simulation::new`] with an RNG seeded from `config.seed`.
    pub fn from_config(config: SimConfig) -> Result<Self, SimulationError> {
        let rng = create_rng(config.seed);
        Self::new(config, rng)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn field(&self) -> &SpatialField {
        &self.field
    }

    pub fn slots(&self) -> &[AgentSlot] {
        &self.slots
    }

    pub fn slot(&self, idx: usize) -> Option<&AgentSlot> {
        self.slots.get(idx)
    }

    pub fn live_elegans(&self) -> impl Iterator<Item = &Elegan> {
        self.slots.iter().filter_map(AgentSlot::live)
    }

    pub fn elegans_remaining(&self) -> usize {
        self.elegans_remaining
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn foods_eaten(&self) -> usize {
        self.foods_eaten
    }

    pub fn deaths(&self) -> usize {
        self.deaths
    }

    pub fn is_done(&self) -> bool {
        self.elegans_remaining < 1
    }

    pub fn info(&self) -> StepInfo {
        StepInfo {
            step: self.step_index,
            elegans_remaining: self.elegans_remaining,
        }
    }

    /// Left/right scent per slot; slots without a live agent read as null.
    pub fn observations(&self) -> PerAgent<Observation> {
        PerAgent::from_vec(
            self.slots
                .iter()
                .map(|slot| self.field.observation_for(slot.live()))
                .collect(),
        )
    }

    /// Owned snapshot of the field with every live agent painted in.
    pub fn render_frame(&self) -> Frame {
        self.field.render(self.live_elegans())
    }

    /// Advance every slot by one tick in index order.
    ///
    /// Extra directions beyond the slot count are ignored; fewer than one per
    /// slot is rejected before anything moves. Once no agent remains the call
    /// is a no-op that reports `done`.
    pub fn step(&mut self, directions: impl Into<Directions>) -> Result<StepOutcome, SimulationError> {
        if self.is_done() {
            return Ok(self.terminal_outcome());
        }
        let mut turns = directions.into().into_vec();
        let slot_count = self.slots.len();
        if turns.len() < slot_count {
            return Err(SimulationError::MalformedInput {
                expected: slot_count,
                actual: turns.len(),
            });
        }
        turns.truncate(slot_count);

        self.step_index = self.step_index.saturating_add(1);
        let rewards: Vec<f32> = turns
            .into_iter()
            .enumerate()
            .map(|(idx, turn)| self.step_slot(idx, turn))
            .collect();

        Ok(StepOutcome {
            observations: self.observations(),
            rewards: PerAgent::from_vec(rewards),
            done: self.is_done(),
            info: self.info(),
        })
    }

    fn terminal_outcome(&self) -> StepOutcome {
        let n = self.slots.len();
        StepOutcome {
            observations: PerAgent::from_vec(vec![SpatialField::null_observation(); n]),
            rewards: PerAgent::from_vec(vec![0.0; n]),
            done: true,
            info: self.info(),
        }
    }

    /// Cells covered by live agents, food must not spawn under them.
    fn occupied_cells(&self) -> Vec<Coord> {
        self.live_elegans().flat_map(|e| e.cells()).collect()
    }
}

mod phases;
