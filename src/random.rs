//! Seedable random generator used by the runners.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The generator type produced by [`create_rng`].
///
/// ChaCha8 is portable and its stream is stable across platforms and
/// releases, so a seed replays the same run everywhere.
pub type GsaRng = ChaCha8Rng;

/// Creates a generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> GsaRng {
    ChaCha8Rng::seed_from_u64(seed)
}
