//! Route planning strategies, one per route category.
//!
//! Each planner picks endpoint pairs according to its policy, runs the
//! matching search and restores the found paths into segments. Planners only
//! write density (and, for main roads, suitability) through the
//! [`GraphView`] they are handed.

use tracing::{debug, error, warn};

use crate::config::RoutingConfig;
use crate::cost::{DirectWater, IndirectWater, Overland, RoadSeeking};
use crate::graph::GraphView;
use crate::map::{Burg, CellId, FeatureId, TerrainMap};
use crate::restore::{restore_path, RouteCategory, RouteSegment, WalkStatus};
use crate::search::{search, PredecessorMap};

/// Trait for route planning strategies.
pub trait RoutePlanner {
    /// Category of every segment this planner emits.
    fn category(&self) -> RouteCategory;

    /// Plan all routes of this category, mutating density as paths are restored.
    fn plan(&self, view: &mut GraphView<'_>) -> Vec<RouteSegment>;
}

/// Connects every pair of capitals that share a landmass.
#[derive(Debug, Clone)]
pub struct MainRoadPlanner {
    config: RoutingConfig,
}

impl MainRoadPlanner {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }
}

impl RoutePlanner for MainRoadPlanner {
    fn category(&self) -> RouteCategory {
        RouteCategory::Main
    }

    fn plan(&self, view: &mut GraphView<'_>) -> Vec<RouteSegment> {
        let map = view.map();
        let mut capitals: Vec<&Burg> = map.active_burgs().filter(|burg| burg.capital).collect();
        if capitals.len() < 2 {
            debug!(capitals = capitals.len(), "not enough capitals for main roads");
            return Vec::new();
        }
        capitals.sort_by_key(|burg| burg.id);

        let mut segments = Vec::new();
        for (index, from) in capitals.iter().enumerate() {
            for to in capitals[index + 1..]
                .iter()
                .filter(|other| other.feature == from.feature)
            {
                if from.cell == to.cell {
                    continue;
                }
                let model = Overland::new(&self.config, Some(to.cell));
                let outcome = search(view, from.cell, &model, self.config.search_mode);
                if !outcome.predecessors.reaches(to.cell, from.cell) {
                    debug!(from = from.id, to = to.id, "capitals are not connected by land");
                    continue;
                }
                segments.extend(restore(
                    view,
                    &self.config,
                    &outcome.predecessors,
                    from.cell,
                    to.cell,
                    RouteCategory::Main,
                ));
            }
        }

        view.blend_into_suitability(self.config.suitability_factor);
        segments
    }
}

/// Links every settlement on a landmass to the local road network.
#[derive(Debug, Clone)]
pub struct TrailPlanner {
    config: RoutingConfig,
}

impl TrailPlanner {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Backbone from the island's first settlement to the one farthest from it.
    fn backbone(&self, view: &mut GraphView<'_>, isle: &[&Burg]) -> Vec<RouteSegment> {
        let first = isle[0];
        let Some(farthest) = farthest_from(first, isle[1..].iter().copied()) else {
            return Vec::new();
        };

        let model = Overland::new(&self.config, Some(farthest.cell));
        let outcome = search(view, first.cell, &model, self.config.search_mode);
        if !outcome.predecessors.reaches(farthest.cell, first.cell) {
            debug!(
                from = first.id,
                to = farthest.id,
                "trail backbone endpoints are not connected"
            );
            return Vec::new();
        }

        restore(
            view,
            &self.config,
            &outcome.predecessors,
            first.cell,
            farthest.cell,
            RouteCategory::Trail,
        )
    }

    /// Path from `burg` to the closest cell that already carries a road.
    fn spur(&self, view: &mut GraphView<'_>, burg: &Burg) -> Vec<RouteSegment> {
        if view.has_density(burg.cell) {
            debug!(burg = burg.id, "settlement already on a road");
            return Vec::new();
        }

        let model = RoadSeeking::new(&self.config);
        let outcome = search(view, burg.cell, &model, self.config.search_mode);
        let Some(exit) = outcome.exit else {
            debug!(burg = burg.id, "no reachable road for settlement");
            return Vec::new();
        };

        restore(
            view,
            &self.config,
            &outcome.predecessors,
            burg.cell,
            exit,
            RouteCategory::Trail,
        )
    }
}

impl RoutePlanner for TrailPlanner {
    fn category(&self) -> RouteCategory {
        RouteCategory::Trail
    }

    fn plan(&self, view: &mut GraphView<'_>) -> Vec<RouteSegment> {
        let map = view.map();
        let burgs: Vec<&Burg> = map.active_burgs().collect();
        if burgs.len() < 2 {
            return Vec::new();
        }

        let mut segments = Vec::new();
        for feature in map.land_features() {
            let isle: Vec<&Burg> = burgs
                .iter()
                .copied()
                .filter(|burg| burg.feature == feature.id)
                .collect();
            if isle.len() < 2 {
                continue;
            }

            segments.extend(self.backbone(view, &isle));
            for burg in &isle[1..] {
                segments.extend(self.spur(view, burg));
            }
        }
        segments
    }
}

/// Connects the ports of each water body.
#[derive(Debug, Clone)]
pub struct SeaRoutePlanner {
    config: RoutingConfig,
}

impl SeaRoutePlanner {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Direct lane from `from` into `to`, ending on `to` through its haven.
    fn direct(&self, view: &mut GraphView<'_>, from: &Burg, to: &Burg) -> Vec<RouteSegment> {
        if from.cell == to.cell {
            return Vec::new();
        }

        let model = DirectWater::new(&self.config, to.cell);
        let outcome = search(view, from.cell, &model, self.config.search_mode);
        if outcome.exit != Some(to.cell) {
            debug!(from = from.id, to = to.id, "ports are not connected by water");
            return Vec::new();
        }

        let mut predecessors = outcome.predecessors;
        if !attach_haven(view.map(), &self.config, &mut predecessors, to.cell)
            || !predecessors.reaches(to.cell, from.cell)
        {
            return Vec::new();
        }

        restore(
            view,
            &self.config,
            &predecessors,
            from.cell,
            to.cell,
            RouteCategory::Sea,
        )
    }

    /// One search from `hub` shared by lanes to every other port in `ports`.
    fn fan_out(
        &self,
        view: &mut GraphView<'_>,
        hub: &Burg,
        ports: &[&Burg],
        skip: CellId,
    ) -> Vec<RouteSegment> {
        let model = IndirectWater::new(&self.config);
        let mut predecessors = search(view, hub.cell, &model, self.config.search_mode).predecessors;

        let mut segments = Vec::new();
        for port in ports {
            if port.cell == hub.cell || port.cell == skip {
                continue;
            }
            if !attach_haven(view.map(), &self.config, &mut predecessors, port.cell) {
                warn!(port = port.id, "port has no reachable haven");
                continue;
            }
            if !predecessors.reaches(port.cell, hub.cell) {
                debug!(from = hub.id, to = port.id, "port is not reachable from hub");
                continue;
            }
            segments.extend(restore(
                view,
                &self.config,
                &predecessors,
                hub.cell,
                port.cell,
                RouteCategory::Sea,
            ));
        }
        segments
    }
}

impl RoutePlanner for SeaRoutePlanner {
    fn category(&self) -> RouteCategory {
        RouteCategory::Sea
    }

    fn plan(&self, view: &mut GraphView<'_>) -> Vec<RouteSegment> {
        let map = view.map();
        let ports: Vec<&Burg> = map.active_burgs().filter(|burg| burg.is_port()).collect();
        if ports.len() < 2 {
            return Vec::new();
        }

        let mut segments = Vec::new();
        for (body, group) in group_by_water_body(&ports) {
            if group.len() < 2 {
                continue;
            }
            let first = group[0];
            let Some(farthest) = farthest_from(first, group[1..].iter().copied()) else {
                continue;
            };
            debug!(body, ports = group.len(), "connecting water body");

            segments.extend(self.direct(view, farthest, first));

            let same_landmass: Vec<&Burg> = group
                .iter()
                .copied()
                .filter(|port| port.feature == first.feature)
                .collect();
            if same_landmass.len() > 3 {
                let others = same_landmass[1..].iter().copied();
                if let Some(opposite) = farthest_from(first, others) {
                    segments.extend(self.direct(view, opposite, first));
                }
            }

            if group.len() >= 3 {
                segments.extend(self.fan_out(view, first, &group, farthest.cell));
            }
        }
        segments
    }
}

/// Select the planner for a route category.
pub fn select_planner(category: RouteCategory, config: RoutingConfig) -> Box<dyn RoutePlanner> {
    match category {
        RouteCategory::Main => Box::new(MainRoadPlanner::new(config)),
        RouteCategory::Trail => Box::new(TrailPlanner::new(config)),
        RouteCategory::Sea => Box::new(SeaRoutePlanner::new(config)),
    }
}

/// Restore one path and report a broken predecessor map loudly.
fn restore(
    view: &mut GraphView<'_>,
    config: &RoutingConfig,
    predecessors: &PredecessorMap,
    start: CellId,
    end: CellId,
    category: RouteCategory,
) -> Vec<RouteSegment> {
    let restoration = restore_path(
        view,
        predecessors,
        start,
        end,
        category,
        config.scores.for_category(category),
        config.restore_limit,
    );

    match restoration.status {
        WalkStatus::ReachedStart => {}
        WalkStatus::DeadEnd => {
            warn!(start, end, %category, "restoration stopped before reaching the start");
        }
        WalkStatus::LimitExceeded => {
            error!(
                start,
                end,
                %category,
                limit = config.restore_limit,
                "restoration hit the step ceiling; route is truncated"
            );
        }
    }
    restoration.segments
}

/// Candidate farthest from `origin` by squared distance; the first maximum
/// wins and candidates sharing the origin's cell are ignored.
fn farthest_from<'b>(
    origin: &Burg,
    candidates: impl Iterator<Item = &'b Burg>,
) -> Option<&'b Burg> {
    let mut best: Option<(&Burg, f64)> = None;
    for candidate in candidates.filter(|candidate| candidate.cell != origin.cell) {
        let distance = origin.position.distance_squared(&candidate.position);
        if best.map_or(true, |(_, current)| distance > current) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(burg, _)| burg)
}

/// Ports grouped by water body, groups in order of first appearance.
fn group_by_water_body<'b>(ports: &[&'b Burg]) -> Vec<(FeatureId, Vec<&'b Burg>)> {
    let mut groups: Vec<(FeatureId, Vec<&Burg>)> = Vec::new();
    for &port in ports {
        match groups.iter_mut().find(|(body, _)| *body == port.port) {
            Some((_, members)) => members.push(port),
            None => groups.push((port.port, vec![port])),
        }
    }
    groups
}

/// Make the port cell's predecessor its haven so lanes end on the port.
///
/// Falls back to an already recorded approach, then to any discovered water
/// neighbour. Returns `false` when the port cannot be attached.
fn attach_haven(
    map: &TerrainMap,
    config: &RoutingConfig,
    predecessors: &mut PredecessorMap,
    port_cell: CellId,
) -> bool {
    let cell = map.cell(port_cell);
    if let Some(haven) = cell.haven.filter(|&haven| predecessors.contains(haven)) {
        predecessors.set(port_cell, haven);
        return true;
    }
    if predecessors.contains(port_cell) {
        return true;
    }

    let approach = cell.neighbors.iter().copied().find(|&neighbor| {
        predecessors.contains(neighbor) && !map.cell(neighbor).is_land(config.water_level)
    });
    match approach {
        Some(neighbor) => {
            predecessors.set(port_cell, neighbor);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Point;

    fn burg(id: u32, cell: CellId, x: f64, y: f64) -> Burg {
        Burg::new(id, cell, Point::new(x, y), 1)
    }

    #[test]
    fn farthest_prefers_first_maximum() {
        let origin = burg(1, 0, 0.0, 0.0);
        let a = burg(2, 1, 3.0, 4.0);
        let b = burg(3, 2, -4.0, 3.0);
        let c = burg(4, 3, 1.0, 1.0);
        let found = farthest_from(&origin, [&a, &b, &c].into_iter());
        assert_eq!(found.map(|burg| burg.id), Some(2));
    }

    #[test]
    fn farthest_ignores_same_cell() {
        let origin = burg(1, 0, 0.0, 0.0);
        let twin = burg(2, 0, 9.0, 9.0);
        assert!(farthest_from(&origin, [&twin].into_iter()).is_none());
    }

    #[test]
    fn water_bodies_keep_first_appearance_order() {
        let a = burg(1, 0, 0.0, 0.0).port_on(7);
        let b = burg(2, 1, 0.0, 0.0).port_on(3);
        let c = burg(3, 2, 0.0, 0.0).port_on(7);
        let groups = group_by_water_body(&[&a, &b, &c]);

        let summary: Vec<(FeatureId, Vec<u32>)> = groups
            .iter()
            .map(|(body, members)| (*body, members.iter().map(|burg| burg.id).collect()))
            .collect();
        assert_eq!(summary, vec![(7, vec![1, 3]), (3, vec![2])]);
    }

    #[test]
    fn select_planner_chooses_correct_category() {
        for category in [RouteCategory::Main, RouteCategory::Trail, RouteCategory::Sea] {
            let planner = select_planner(category, RoutingConfig::default());
            assert_eq!(planner.category(), category);
        }
    }
}
