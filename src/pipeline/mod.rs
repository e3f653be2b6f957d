pub mod composer;
pub mod policy;
pub mod sequence;

pub use composer::{clock_seed, rng_from_seed, Composer};
pub use policy::{GrowingLoop, MutatingLoop, Policy, RandomWalk};
pub use sequence::{NodeId, Sequence};
