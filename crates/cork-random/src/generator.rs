use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cork_types::CorkError;

use crate::seed::{combine_seed, SeedValue};

/// Reproducible pseudorandom source for mock payloads.
///
/// Two generators seeded with inputs that combine to the same integer
/// produce identical sequences for identical call sequences. An instance is
/// meant to be owned by one request or test; it is not shared across tasks.
#[derive(Debug)]
pub struct SeededGenerator {
    pub(crate) rng: StdRng,
    seed: Option<u64>,
}

impl SeededGenerator {
    /// Entropy-seeded, non-reproducible generator.
    pub fn new() -> Self {
        SeededGenerator { rng: StdRng::from_os_rng(), seed: None }
    }

    pub fn from_u64(seed: u64) -> Self {
        SeededGenerator { rng: StdRng::seed_from_u64(seed), seed: Some(seed) }
    }

    /// Seed from heterogeneous inputs. An empty slice seeds from entropy.
    pub fn from_seed(inputs: &[SeedValue]) -> Result<Self, CorkError> {
        let mut generator = Self::new();
        generator.seed(inputs)?;
        Ok(generator)
    }

    /// Re-seed in place, discarding all prior state.
    ///
    /// If the inputs cannot be hashed the generator is left as it was.
    pub fn seed(&mut self, inputs: &[SeedValue]) -> Result<(), CorkError> {
        match combine_seed(inputs)? {
            Some(seed) => {
                tracing::trace!(seed, "seeding generator");
                *self = Self::from_u64(seed);
            }
            None => *self = Self::new(),
        }
        Ok(())
    }

    /// The combined seed, or `None` when running from entropy.
    pub fn seed_value(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform `f64` in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform integer in `[low, high]`. Reversed bounds are swapped.
    pub fn randint(&mut self, low: i64, high: i64) -> i64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        self.rng.random_range(low..=high)
    }

    /// Uniformly chosen element, or `None` for an empty slice.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..items.len());
        items.get(idx)
    }

    /// Variadic choice over an argument list.
    ///
    /// A single [`SeedValue::List`] argument is treated as the candidate pool;
    /// otherwise the arguments themselves are the pool. No arguments yields
    /// `None`.
    pub fn choose_arg(&mut self, args: &[SeedValue]) -> Option<SeedValue> {
        match args {
            [SeedValue::List(items)] => self.choice(items).cloned(),
            _ => self.choice(args).cloned(),
        }
    }
}

impl Default for SeededGenerator {
    fn default() -> Self {
        Self::new()
    }
}
