/// Largest accepted grid dimension (cells per side). Bounds the O(w*h) scent fill.
pub const MAX_GRID_DIMENSION: usize = 512;

/// Largest accepted pixel buffer (`width*unit_size * height*unit_size`).
pub const MAX_PIXELS: usize = 16 * 1024 * 1024;

/// Agent count must stay strictly below this regardless of grid width.
pub const MAX_ELEGANS: usize = 25;

/// Row every agent's head starts on.
pub const START_ROW: i32 = 4;

/// Cells occupied at spawn: the head plus two body segments.
pub const START_BODY_LENGTH: usize = 3;

/// Pixel value of an untouched cell.
pub const SPACE_COLOR: f32 = 0.0;

/// Base paint value for agents; slot `i` is painted `ELEGAN_COLOR * (i + 1)`.
pub const ELEGAN_COLOR: f32 = -1.0;

/// Default scent intensity at a food cell.
pub const FOOD_COLOR: f32 = 1.0;

/// Number of relative turns an agent accepts (left, straight, right).
pub const ACTION_COUNT: usize = 3;

/// Scent readings per agent (left, right).
pub const OBSERVATION_SIZE: usize = 2;

/// Prime multiplier used to derive per-episode RNG streams from a base seed.
pub const RNG_DERIVATION_PRIME: u64 = 7919;

/// Mixed into the base seed for policy streams so they never replay food placement.
pub const POLICY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;
