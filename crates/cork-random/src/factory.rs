use cork_types::CorkError;

use crate::generator::SeededGenerator;
use crate::seed::SeedValue;

/// Hands out one fresh [`SeededGenerator`] per request or session.
///
/// Every generator is seeded with the factory's base inputs followed by the
/// caller's extra inputs. With neither, generators run from entropy.
#[derive(Debug, Clone, Default)]
pub struct GeneratorFactory {
    base: Vec<SeedValue>,
}

impl GeneratorFactory {
    pub fn new(base: Vec<SeedValue>) -> Self {
        GeneratorFactory { base }
    }

    /// Factory whose generators are only as deterministic as their extra inputs.
    pub fn entropy() -> Self {
        Self::default()
    }

    pub fn base(&self) -> &[SeedValue] {
        &self.base
    }

    pub fn generator(&self, extra: &[SeedValue]) -> Result<SeededGenerator, CorkError> {
        let mut inputs = self.base.clone();
        inputs.extend_from_slice(extra);
        SeededGenerator::from_seed(&inputs)
    }
}
