//! Uniform sampling of agent indices.

use crate::rand::seq::index::sample as choose_range;
use crate::rand::Rng;

/// Sample `requested` distinct indices uniformly without replacement from `0..length`. If more
/// indices are requested than exist, every index is returned (in random order).
///
/// The order of the returned indices is the order in which they were drawn.
pub fn sample_indices<R>(rng: &mut R, length: usize, requested: usize) -> Vec<usize>
where
    R: Rng,
{
    choose_range(rng, length, requested.min(length)).into_vec()
}
