//! The energy field: clustered resource cells on a toroidal grid.
//!
//! Cells hold a fixed yield. Claiming a cell hands out the yield once and
//! removes the cell, so claims are idempotent within a tick. Placement is
//! clustered around randomly chosen centers and bounded: when a cluster
//! is too crowded to host another cell, placement fails instead of
//! spinning.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sugarscape_core::context::VisibleResource;
use sugarscape_core::error::{Result, SimError};
use sugarscape_core::types::{Energy, GridPos};
use tracing::debug;

/// Draws allowed per cell before placement gives up.
pub const PLACEMENT_ATTEMPTS: usize = 10_000;

/// Parameters shared by initial placement and trickle spawning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    pub clusters: usize,
    pub cluster_radius: i64,
    pub spawn_rate: f64,
    pub resource_yield: Energy,
}

/// Resource cells keyed by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyField {
    size: i64,
    params: FieldParams,
    cells: BTreeMap<GridPos, Energy>,
}

impl EnergyField {
    pub fn new(size: i64, params: FieldParams) -> Self {
        Self {
            size,
            params,
            cells: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn amount_at(&self, pos: GridPos) -> Option<Energy> {
        self.cells.get(&pos).copied()
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, Energy)> + '_ {
        self.cells.iter().map(|(pos, amount)| (*pos, *amount))
    }

    /// Place one cell at an explicit position.
    pub fn insert(&mut self, pos: GridPos, amount: Energy) -> Result<()> {
        if !pos.in_bounds(self.size) {
            return Err(SimError::invalid_config("resource", pos, "position outside the grid"));
        }
        if amount <= 0 {
            return Err(SimError::invalid_config("resource", amount, "amount must be positive"));
        }
        if self.cells.contains_key(&pos) {
            return Err(SimError::invalid_config("resource", pos, "cell already occupied"));
        }
        self.cells.insert(pos, amount);
        Ok(())
    }

    /// Take the energy at `pos`. Returns 0 when the cell is empty.
    pub fn claim(&mut self, pos: GridPos) -> Energy {
        self.cells.remove(&pos).unwrap_or(0)
    }

    /// Place `count` new cells spread over `clusters` random centers.
    ///
    /// Centers are drawn from `[radius, size - 1 - radius]` on both axes so
    /// clusters never straddle the seam. Each cell picks a center at random
    /// and retries offsets until it lands on a free cell. The placement is
    /// all-or-nothing: on [`SimError::CapacityExhausted`] the field is
    /// unchanged.
    pub fn spawn_clusters<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        clusters: usize,
        radius: i64,
    ) -> Result<usize> {
        if count == 0 {
            return Ok(0);
        }
        if clusters == 0 {
            return Err(SimError::invalid_config("resource_clusters", 0, "no cluster to place into"));
        }
        if radius < 0 || 2 * radius > self.size - 1 {
            return Err(SimError::invalid_config(
                "cluster_radius",
                radius,
                format!("clusters must fit inside a grid of size {}", self.size),
            ));
        }

        let centers: Vec<GridPos> = (0..clusters)
            .map(|_| {
                GridPos::new(
                    rng.gen_range(radius..=self.size - 1 - radius),
                    rng.gen_range(radius..=self.size - 1 - radius),
                )
            })
            .collect();

        let mut staged: BTreeMap<GridPos, Energy> = BTreeMap::new();
        for placed in 0..count {
            let center = centers[rng.gen_range(0..centers.len())];
            let mut attempts = 0;
            loop {
                if attempts == PLACEMENT_ATTEMPTS {
                    return Err(SimError::CapacityExhausted {
                        placed,
                        requested: count,
                        attempts,
                    });
                }
                attempts += 1;
                let pos = GridPos::new(
                    center.x + rng.gen_range(-radius..=radius),
                    center.y + rng.gen_range(-radius..=radius),
                );
                if !self.cells.contains_key(&pos) && !staged.contains_key(&pos) {
                    staged.insert(pos, self.params.resource_yield);
                    break;
                }
            }
        }

        self.cells.extend(staged);
        debug!(count, clusters, total = self.cells.len(), "resource cells placed");
        Ok(count)
    }

    /// Trickle spawning: one Bernoulli trial per tick for a single new cell.
    ///
    /// Returns whether a cell was placed.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool> {
        let rate = self.params.spawn_rate.clamp(0.0, 1.0);
        if rate == 0.0 || !rng.gen_bool(rate) {
            return Ok(false);
        }
        self.spawn_clusters(rng, 1, self.params.clusters, self.params.cluster_radius)?;
        Ok(true)
    }

    /// Cells within Chebyshev `range` of `center`, by plain coordinate
    /// difference. Resources across the wrap seam are not seen.
    pub fn visible_from(&self, center: GridPos, range: i64) -> Vec<VisibleResource> {
        self.cells
            .iter()
            .filter(|(pos, _)| pos.within(center, range))
            .map(|(pos, amount)| {
                let (dx, dy) = center.offset_to(*pos);
                VisibleResource { dx, dy, amount: *amount }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params() -> FieldParams {
        FieldParams {
            clusters: 3,
            cluster_radius: 5,
            spawn_rate: 0.0,
            resource_yield: 50,
        }
    }

    #[test]
    fn clusters_stay_off_the_seam() {
        let mut field = EnergyField::new(30, params());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(field.spawn_clusters(&mut rng, 20, 3, 5).unwrap(), 20);
        assert_eq!(field.len(), 20);
        for (pos, amount) in field.cells() {
            assert!(pos.in_bounds(30), "{pos} out of bounds");
            assert_eq!(amount, 50);
        }
    }

    #[test]
    fn claim_is_idempotent() {
        let mut field = EnergyField::new(10, params());
        field.insert(GridPos::new(4, 4), 50).unwrap();
        assert_eq!(field.claim(GridPos::new(4, 4)), 50);
        assert_eq!(field.claim(GridPos::new(4, 4)), 0);
        assert!(field.is_empty());
    }

    #[test]
    fn insert_rejects_bad_cells() {
        let mut field = EnergyField::new(10, params());
        assert!(field.insert(GridPos::new(10, 0), 50).is_err());
        assert!(field.insert(GridPos::new(1, 1), 0).is_err());
        field.insert(GridPos::new(1, 1), 50).unwrap();
        assert!(field.insert(GridPos::new(1, 1), 50).is_err());
    }

    #[test]
    fn crowded_cluster_reports_capacity_exhausted() {
        let mut field = EnergyField::new(5, params());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        // A radius-0 cluster has room for exactly one cell.
        let err = field.spawn_clusters(&mut rng, 2, 1, 0).unwrap_err();
        match err {
            SimError::CapacityExhausted { placed, requested, attempts } => {
                assert_eq!(placed, 1);
                assert_eq!(requested, 2);
                assert_eq!(attempts, PLACEMENT_ATTEMPTS);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(field.is_empty(), "failed placement must not leave partial cells");
    }

    #[test]
    fn certain_spawn_rate_adds_one_cell_per_tick() {
        let mut field = EnergyField::new(30, FieldParams { spawn_rate: 1.0, ..params() });
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(field.tick(&mut rng).unwrap());
        assert!(field.tick(&mut rng).unwrap());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn zero_spawn_rate_never_spawns() {
        let mut field = EnergyField::new(30, params());
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(!field.tick(&mut rng).unwrap());
        }
        assert!(field.is_empty());
    }

    #[test]
    fn visibility_does_not_wrap() {
        let mut field = EnergyField::new(30, params());
        field.insert(GridPos::new(29, 0), 50).unwrap();
        field.insert(GridPos::new(3, 2), 50).unwrap();
        let seen = field.visible_from(GridPos::new(0, 0), 5);
        assert_eq!(seen, vec![VisibleResource { dx: 3, dy: 2, amount: 50 }]);
    }
}
