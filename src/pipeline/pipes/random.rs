//! Random sampling filter.

use crate::element::Item;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::pipe::{Pipe, Upstream};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Keeps each value with probability `bias`.
pub struct RandomFilterPipe {
    upstream: Upstream,
    bias: f64,
    rng: StdRng,
}

impl RandomFilterPipe {
    /// A fixed `seed` makes the selection repeatable across compiles.
    pub fn new(bias: f64, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            upstream: Upstream::default(),
            bias,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Pipe for RandomFilterPipe {
    fn name(&self) -> &str {
        "RandomFilter"
    }

    fn set_upstream(&mut self, upstream: Box<dyn Pipe>) {
        self.upstream.set(upstream);
    }

    fn upstream(&self) -> Option<&(dyn Pipe + 'static)> {
        self.upstream.get()
    }

    fn upstream_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)> {
        self.upstream.get_mut()
    }

    fn next_match(&mut self) -> PipelineResult<Option<Item>> {
        while let Some(item) = self.upstream.pull("RandomFilter")? {
            if self.rng.random::<f64>() < self.bias {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipes::IterPipe;

    fn sample(bias: f64, seed: u64) -> Vec<Item> {
        let mut pipe = RandomFilterPipe::new(bias, Some(seed));
        pipe.set_upstream(Box::new(IterPipe::from_items(
            (0..100).map(Item::from).collect(),
        )));
        let mut out = Vec::new();
        while let Some(item) = pipe.next_match().unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_extreme_biases() {
        assert!(sample(0.0, 1).is_empty());
        assert_eq!(sample(1.0, 1).len(), 100);
    }

    #[test]
    fn test_seed_is_repeatable() {
        assert_eq!(sample(0.5, 42), sample(0.5, 42));
    }
}
