//! Seeded noise generator for simulated readings.
//!
//! Wraps a seeded ChaCha RNG behind a mutex so instruments can jitter their
//! readings deterministically in tests: the same seed always produces the same
//! sequence.

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Thread-safe, optionally seeded noise source.
pub struct NoiseSource {
    inner: Mutex<ChaCha8Rng>,
}

impl NoiseSource {
    /// Create a noise source. With `seed` absent, seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// A uniform sample in `(-magnitude, magnitude)`, or zero when the
    /// magnitude is zero.
    pub fn jitter(&self, magnitude: f64) -> f64 {
        if magnitude <= 0.0 {
            return 0.0;
        }
        let mut rng = self.inner.lock().unwrap();
        rng.gen_range(-magnitude..magnitude)
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for NoiseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSource")
            .field("inner", &"<Mutex<ChaCha8Rng>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_noise_is_deterministic() {
        let a = NoiseSource::new(Some(42));
        let b = NoiseSource::new(Some(42));
        assert_eq!(a.jitter(1.0), b.jitter(1.0));
    }

    #[test]
    fn test_zero_magnitude_is_silent() {
        let noise = NoiseSource::new(Some(7));
        for _ in 0..10 {
            assert_eq!(noise.jitter(0.0), 0.0);
        }
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let noise = NoiseSource::new(Some(7));
        for _ in 0..100 {
            let sample = noise.jitter(0.5);
            assert!(sample > -0.5 && sample < 0.5);
        }
    }
}
