use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GenerateError;
use crate::problem::TransportProblem;

/// Random balanced transportation instances with integer data.
///
/// Supply and demand values are drawn from `[1, max_quantity)` and costs from
/// `[0, max_cost)`. The side with the larger total is then lowered one random node at a
/// time, never below 1, until both totals match.
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    rng: StdRng,
}

impl InstanceGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Node count drawn from `[min, max)`, or `min` when the range is empty
    pub fn sample_size(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    pub fn generate(
        &mut self,
        num_supply: usize,
        num_demand: usize,
        max_cost: u32,
        max_quantity: u32,
    ) -> Result<TransportProblem, GenerateError> {
        if num_supply == 0 || num_demand == 0 {
            return Err(GenerateError::InvalidParameter(format!(
                "need at least one supply and one demand node, got {}x{}",
                num_supply, num_demand
            )));
        }
        if max_quantity < 2 {
            return Err(GenerateError::InvalidParameter(format!(
                "max_quantity must be at least 2, got {}",
                max_quantity
            )));
        }
        if max_cost < 1 {
            return Err(GenerateError::InvalidParameter("max_cost must be at least 1".to_string()));
        }

        let mut supply: Vec<u64> = (0..num_supply)
            .map(|_| self.rng.gen_range(1..max_quantity) as u64)
            .collect();
        let mut demand: Vec<u64> = (0..num_demand)
            .map(|_| self.rng.gen_range(1..max_quantity) as u64)
            .collect();

        let total_supply: u64 = supply.iter().sum();
        let total_demand: u64 = demand.iter().sum();
        if total_supply > total_demand {
            self.rebalance(&mut supply, &mut demand, total_supply - total_demand);
        } else if total_demand > total_supply {
            self.rebalance(&mut demand, &mut supply, total_demand - total_supply);
        }

        let cost = (0..num_supply)
            .map(|_| (0..num_demand).map(|_| self.rng.gen_range(0..max_cost) as f64).collect())
            .collect();

        Ok(TransportProblem::new(
            supply.into_iter().map(|s| s as f64).collect(),
            demand.into_iter().map(|d| d as f64).collect(),
            cost,
        ))
    }

    /// Remove `diff` units from `surplus`, keeping every node at 1 or more. Whatever
    /// cannot be removed that way is added to a random node of `short`.
    fn rebalance(&mut self, surplus: &mut [u64], short: &mut [u64], mut diff: u64) {
        while diff > 0 {
            let reducible: Vec<usize> = (0..surplus.len()).filter(|&i| surplus[i] > 1).collect();
            if reducible.is_empty() {
                let j = self.rng.gen_range(0..short.len());
                short[j] += diff;
                log::debug!("generator: raised node {} on the short side by {}", j, diff);
                return;
            }
            let i = reducible[self.rng.gen_range(0..reducible.len())];
            let removed = (surplus[i] - 1).min(diff);
            surplus[i] -= removed;
            diff -= removed;
        }
    }
}
