use crate::bits::BitString;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Flip `floor(len * percentage / 100)` distinct bits chosen uniformly at random.
/// Returns the mutated bits and the number of flips applied.
pub fn inject_errors<R: Rng + ?Sized>(
    bits: &BitString,
    percentage: f64,
    rng: &mut R,
) -> (BitString, usize) {
    // also catches NaN
    if bits.is_empty() || !(percentage > 0.0) {
        return (bits.clone(), 0);
    }

    let target = (bits.len() as f64 * percentage / 100.0).floor() as usize;
    let amount = target.min(bits.len());
    if amount == 0 {
        return (bits.clone(), 0);
    }

    let mut noisy = bits.clone();
    for pos in index::sample(rng, bits.len(), amount).iter() {
        noisy.flip(pos);
    }
    (noisy, amount)
}

/// Seeded generator for reproducible runs, entropy-seeded otherwise
pub fn channel_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
