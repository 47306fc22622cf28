use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Derive the RNG for episode `episode`, keeping streams of consecutive episodes apart.
pub fn derive_episode_rng(base_seed: u64, episode: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(
        base_seed.wrapping_add(episode.wrapping_mul(crate::constants::RNG_DERIVATION_PRIME)),
    )
}

/// RNG for an external policy acting in episode `episode`, disjoint from the
/// food-placement streams `base_seed + k` that episodes run with.
pub fn derive_policy_rng(base_seed: u64, episode: u64) -> ChaCha12Rng {
    derive_episode_rng(base_seed ^ crate::constants::POLICY_SEED_SALT, episode)
}
