//! Named, independently seeded random number streams.
//!
//! Every stochastic step of a model draws from a stream identified by a type declared with
//! [`define_rng!`]. Each stream is seeded from a shared base seed combined with a hash of the
//! stream's name, so two streams never share a sequence and adding draws to one stage of a model
//! leaves the draws of the other stages unchanged. An [`RngStreams`] is an ordinary value owned by
//! whoever runs the model, never global state, so independent runs can live side by side (or on
//! separate threads) and replay exactly given the same base seed.
mod macros;
mod sampling_algorithms;

use std::any::{Any, TypeId};

use log::trace;

pub use macros::define_rng;
pub use sampling_algorithms::sample_indices;

use crate::hashing::{hash_str, HashMap};
use crate::rand::{Rng, SeedableRng};

pub trait RngId: Copy + Clone + 'static {
    type RngType: SeedableRng + Send + 'static;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any + Send>,
}

/// Holds a base seed and the lazily created generators derived from it, keyed by their `RngId`.
pub struct RngStreams {
    base_seed: u64,
    rng_holders: HashMap<TypeId, RngHolder>,
}

impl RngStreams {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        RngStreams {
            base_seed,
            rng_holders: HashMap::default(),
        }
    }

    /// Gets a mutable reference to the random number generator associated with the given
    /// [`RngId`]. If the Rng has not been used before, one will be created from the base seed.
    pub fn get_rng<R: RngId>(&mut self, _rng_id: R) -> &mut R::RngType {
        let base_seed = self.base_seed;
        self.rng_holders
            .entry(TypeId::of::<R>())
            // Create a new rng holder if it doesn't exist yet
            .or_insert_with(|| {
                trace!(
                    "creating new RNG (seed={}) for {}",
                    base_seed,
                    R::get_name()
                );
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .unwrap()
    }

    /// Gets a random sample from the random number generator associated with the given
    /// [`RngId`] by applying the specified sampler function.
    pub fn sample<R: RngId, T>(
        &mut self,
        rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        sampler(self.get_rng(rng_id))
    }

    /// Gets a random boolean value which is true with probability `p`
    /// using the generator associated with the given [`RngId`].
    ///
    /// # Panics
    ///
    /// Panics if `p` does not lie in `[0, 1]`.
    pub fn sample_bool<R: RngId>(&mut self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }

    /// Draws `requested` distinct indices from `0..length` without replacement using the
    /// generator associated with the given [`RngId`]. At most `length` indices are returned.
    pub fn sample_indices<R: RngId>(
        &mut self,
        rng_id: R,
        length: usize,
        requested: usize,
    ) -> Vec<usize>
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| sample_indices(rng, length, requested))
    }
}
