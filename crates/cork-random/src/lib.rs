//! Reproducible pseudorandom data for mock responses.
//!
//! A [`SeededGenerator`] is seeded from any mix of [`SeedValue`]s. The inputs
//! are hashed and XOR-folded into one integer, so the same inputs always give
//! the same stream. On top of the stream sit element choice, pattern-based
//! string synthesis and random-line sampling from files.

pub mod factory;
pub mod generator;
pub mod line;
pub mod pattern;
pub mod seed;

pub use factory::GeneratorFactory;
pub use generator::SeededGenerator;
pub use line::MAX_LINE_ATTEMPTS;
pub use seed::{combine_seed, fnv1a, SeedHash, SeedValue};
