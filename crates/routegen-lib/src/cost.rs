//! Edge cost functions for the four search flavours.
//!
//! A [`CostModel`] answers two questions for the search engine: what it costs
//! to step into a neighbouring cell (or `None` when the cell is off-limits for
//! this medium) and when the search may stop early.

use crate::config::{OverlandCosts, RoadSeekCosts, RoutingConfig, SeaCosts};
use crate::graph::GraphView;
use crate::map::CellId;

/// Early termination rule for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStop {
    /// Explore everything reachable.
    Exhaustive,
    /// Stop once the target has a settled predecessor.
    Target(CellId),
    /// Stop as soon as the target shows up among a popped cell's neighbours,
    /// before any medium filtering. Used when the target itself is off-limits
    /// (a port cell reached over water).
    TargetAdjacent(CellId),
    /// Stop when a popped cell already carries road density.
    ExistingRoad,
}

/// Pluggable edge cost for the frontier search.
pub trait CostModel {
    /// Short label used in diagnostics.
    fn name(&self) -> &'static str;

    /// Cost of stepping from `from` into `to`; `None` filters `to` out.
    ///
    /// Returned costs are always finite and non-negative.
    fn edge_cost(&self, view: &GraphView<'_>, from: CellId, to: CellId) -> Option<f64>;

    fn early_stop(&self) -> EarlyStop {
        EarlyStop::Exhaustive
    }
}

/// Land search used for main roads and trail backbones.
#[derive(Debug, Clone, Copy)]
pub struct Overland {
    costs: OverlandCosts,
    water_level: u8,
    target: Option<CellId>,
}

impl Overland {
    pub fn new(config: &RoutingConfig, target: Option<CellId>) -> Self {
        Self {
            costs: config.overland,
            water_level: config.water_level,
            target,
        }
    }
}

impl CostModel for Overland {
    fn name(&self) -> &'static str {
        "overland"
    }

    fn edge_cost(&self, view: &GraphView<'_>, _from: CellId, to: CellId) -> Option<f64> {
        let cell = view.map().cell(to);
        if !cell.is_land(self.water_level) {
            return None;
        }

        let cost = self.costs.terrain.cost(cell.terrain) + self.costs.height.cost(cell.height);
        if view.has_infrastructure(to) {
            Some(cost / self.costs.infrastructure_discount)
        } else {
            Some(cost)
        }
    }

    fn early_stop(&self) -> EarlyStop {
        self.target.map_or(EarlyStop::Exhaustive, EarlyStop::Target)
    }
}

/// Land search from a settlement towards the closest road.
#[derive(Debug, Clone, Copy)]
pub struct RoadSeeking {
    costs: RoadSeekCosts,
    water_level: u8,
}

impl RoadSeeking {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            costs: config.road_seek,
            water_level: config.water_level,
        }
    }
}

impl CostModel for RoadSeeking {
    fn name(&self) -> &'static str {
        "road_seeking"
    }

    fn edge_cost(&self, view: &GraphView<'_>, _from: CellId, to: CellId) -> Option<f64> {
        let cell = view.map().cell(to);
        if !cell.is_land(self.water_level) {
            return None;
        }

        let cost = self.costs.terrain.cost(cell.terrain)
            + view.map().biome_cost(cell.biome)
            + self.costs.height.cost(cell.height);
        if view.has_infrastructure(to) {
            Some((cost - self.costs.magnet_bonus).max(0.0))
        } else {
            Some(cost)
        }
    }

    fn early_stop(&self) -> EarlyStop {
        EarlyStop::ExistingRoad
    }
}

/// Water search between two specific ports. Penalises existing sea lanes so
/// direct connections spread out.
#[derive(Debug, Clone, Copy)]
pub struct DirectWater {
    costs: SeaCosts,
    water_level: u8,
    target: CellId,
}

impl DirectWater {
    pub fn new(config: &RoutingConfig, target: CellId) -> Self {
        Self {
            costs: config.sea,
            water_level: config.water_level,
            target,
        }
    }
}

impl CostModel for DirectWater {
    fn name(&self) -> &'static str {
        "direct_water"
    }

    fn edge_cost(&self, view: &GraphView<'_>, from: CellId, to: CellId) -> Option<f64> {
        let cell = view.map().cell(to);
        if cell.is_land(self.water_level) {
            return None;
        }

        Some(
            view.distance_squared(from, to)
                + f64::from(view.density(to)) * self.costs.density_penalty
                + self.costs.terrain_penalty(cell.terrain),
        )
    }

    fn early_stop(&self) -> EarlyStop {
        EarlyStop::TargetAdjacent(self.target)
    }
}

/// Water search from one port to a whole water body. Existing lanes are
/// nearly free so routes converge on a shared trunk.
#[derive(Debug, Clone, Copy)]
pub struct IndirectWater {
    costs: SeaCosts,
    water_level: u8,
}

impl IndirectWater {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            costs: config.sea,
            water_level: config.water_level,
        }
    }
}

impl CostModel for IndirectWater {
    fn name(&self) -> &'static str {
        "indirect_water"
    }

    fn edge_cost(&self, view: &GraphView<'_>, from: CellId, to: CellId) -> Option<f64> {
        let cell = view.map().cell(to);
        if cell.is_land(self.water_level) {
            return None;
        }

        if view.has_density(to) {
            Some(self.costs.reuse_cost)
        } else {
            Some(view.distance_squared(from, to) + self.costs.terrain_penalty(cell.terrain))
        }
    }
}
