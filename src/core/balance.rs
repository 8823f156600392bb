//! Pairwise byte leveling across peer containers
//!
//! Adjacent pairs are compared in pool order. The first pair that is not
//! balanced gets a single transfer from the heavier to the lighter side and the
//! sweep restarts at the first pair. Leveling ends when one full sweep finds
//! every pair balanced.
//!
//! A pair is balanced when its size difference is within tolerance, or when
//! the heavier side holds no entry that could move without overshooting.

use crate::core::container::Container;
use crate::core::names::low_detail_of;
use crate::core::pool::ContainerPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default allowed byte difference between adjacent containers
pub const DEFAULT_TOLERANCE: u64 = 500_000;

/// Default hard cap on transfers per leveling run
pub const DEFAULT_MAX_MOVES: usize = 100_000;

/// Leveling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Byte difference under which two containers count as equal
    pub tolerance: u64,

    /// Transfers allowed before leveling gives up
    pub max_moves: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        BalanceConfig {
            tolerance: DEFAULT_TOLERANCE,
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

/// Levels byte load across a pool through repeated pairwise transfers
#[derive(Debug, Clone)]
pub struct BalanceScheduler {
    config: BalanceConfig,
}

impl BalanceScheduler {
    pub fn new(config: BalanceConfig) -> Self {
        BalanceScheduler { config }
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Level the pool and return the number of transfers made
    pub fn level_pool(&self, pool: &mut ContainerPool) -> usize {
        let mut moves = 0;

        while let Some(pair) = self.first_unbalanced_pair(pool) {
            if moves >= self.config.max_moves {
                warn!(
                    "Leveling stopped after {} moves without converging (sizes: {:?})",
                    moves,
                    pool.sizes()
                );
                break;
            }

            let Some((left, right)) = pool.pair_mut(pair, pair + 1) else {
                break;
            };
            let moved = if left.size() > right.size() {
                self.transfer_largest(left, right)
            } else {
                self.transfer_largest(right, left)
            };

            match moved {
                Some(bytes) => {
                    debug!("Moved {} bytes across pair ({}, {})", bytes, pair, pair + 1);
                    moves += 1;
                }
                None => break,
            }
        }

        info!("Leveled pool in {} moves (sizes: {:?})", moves, pool.sizes());
        moves
    }

    /// Equality test for a pair of containers
    pub fn is_balanced(&self, a: &Container, b: &Container) -> bool {
        let difference = a.size().abs_diff(b.size());
        if difference <= self.config.tolerance {
            return true;
        }
        let heavier = if a.size() > b.size() { a } else { b };
        largest_eligible(heavier, difference).is_none()
    }

    /// Move the largest eligible entry, and its low-detail pair, from `from` to `to`
    ///
    /// Returns the bytes moved, or `None` when no entry is eligible.
    pub fn transfer_largest(&self, from: &mut Container, to: &mut Container) -> Option<u64> {
        let difference = from.size().saturating_sub(to.size());
        let index = largest_eligible(from, difference)?;
        let entry = from.remove(index)?;
        let low_detail = from.position_of_stem(&low_detail_of(entry.stem()));

        let mut bytes = entry.len();
        to.push(entry);
        if let Some(low_index) = low_detail {
            if let Some(low) = from.remove(low_index) {
                bytes += low.len();
                to.push(low);
            }
        }
        Some(bytes)
    }

    fn first_unbalanced_pair(&self, pool: &ContainerPool) -> Option<usize> {
        let containers = pool.containers();
        (0..containers.len().saturating_sub(1))
            .find(|&i| !self.is_balanced(&containers[i], &containers[i + 1]))
    }
}

impl Default for BalanceScheduler {
    fn default() -> Self {
        Self::new(BalanceConfig::default())
    }
}

/// Index of the largest non-low-detail entry strictly smaller than `limit`
///
/// Ties resolve to the earliest entry.
fn largest_eligible(container: &Container, limit: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (index, entry) in container.entries().iter().enumerate() {
        if entry.is_low_detail() || entry.len() >= limit {
            continue;
        }
        match best {
            Some((_, len)) if len >= entry.len() => {}
            _ => best = Some((index, entry.len())),
        }
    }
    best.map(|(index, _)| index)
}
