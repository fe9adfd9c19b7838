//! Route network generation.
//!
//! This module provides:
//! - [`RouteGenerator`] - Owns the mutable network state and runs the planners
//! - [`RouteNetwork`] - Segments produced by one generation pass
//! - [`NetworkSummary`] - Counts and density statistics for a pass
//! - [`generate_routes`] - One-shot entry point
//!
//! # Strategy Pattern
//!
//! Each route category is produced by its own [`RoutePlanner`]. The generator
//! runs them in a fixed order (main roads, trails, sea routes) because later
//! planners read the density written by earlier ones.
//!
//! # Example
//!
//! ```ignore
//! use routegen_lib::{generate_routes, RoutingConfig, TerrainMap};
//!
//! let map = TerrainMap::from_path(Path::new("world.json"))?;
//! let network = generate_routes(&map, RoutingConfig::default())?;
//! println!("{} main road segments", network.main.len());
//! ```

mod planner;

pub use planner::{
    select_planner, MainRoadPlanner, RoutePlanner, SeaRoutePlanner, TrailPlanner,
};

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::RoutingConfig;
use crate::error::Result;
use crate::graph::{GraphView, NetworkState};
use crate::map::TerrainMap;
use crate::output::RouteRenderer;
use crate::restore::{RouteCategory, RouteSegment};

/// Segments produced by one full generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteNetwork {
    pub main: Vec<RouteSegment>,
    pub trails: Vec<RouteSegment>,
    pub sea: Vec<RouteSegment>,
}

impl RouteNetwork {
    pub fn segments(&self, category: RouteCategory) -> &[RouteSegment] {
        match category {
            RouteCategory::Main => &self.main,
            RouteCategory::Trail => &self.trails,
            RouteCategory::Sea => &self.sea,
        }
    }

    /// All segments, main roads first.
    pub fn iter(&self) -> impl Iterator<Item = &RouteSegment> {
        self.main.iter().chain(&self.trails).chain(&self.sea)
    }

    pub fn segment_count(&self) -> usize {
        self.main.len() + self.trails.len() + self.sea.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }
}

/// Aggregate statistics over a network and the density it left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub main_segments: usize,
    pub trail_segments: usize,
    pub sea_segments: usize,
    /// Sum of segment lengths; shared junction cells count once per segment.
    pub segment_cells: usize,
    pub cells_with_density: usize,
    pub max_density: u32,
    pub total_density: u64,
}

impl NetworkSummary {
    pub fn new(network: &RouteNetwork, state: &NetworkState) -> Self {
        let densities = state.densities();
        Self {
            main_segments: network.main.len(),
            trail_segments: network.trails.len(),
            sea_segments: network.sea.len(),
            segment_cells: network.iter().map(RouteSegment::len).sum(),
            cells_with_density: densities.iter().filter(|&&value| value > 0).count(),
            max_density: densities.iter().copied().max().unwrap_or(0),
            total_density: densities.iter().map(|&value| u64::from(value)).sum(),
        }
    }
}

/// Drives the planners over one map.
///
/// The generator owns the [`NetworkState`]; the map itself is never mutated.
#[derive(Debug)]
pub struct RouteGenerator<'a> {
    map: &'a TerrainMap,
    config: RoutingConfig,
    state: NetworkState,
}

impl<'a> RouteGenerator<'a> {
    pub fn new(map: &'a TerrainMap, config: RoutingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            map,
            config,
            state: NetworkState::new(map),
        })
    }

    pub fn map(&self) -> &'a TerrainMap {
        self.map
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    /// Main roads between capitals on the same landmass.
    pub fn compute_main_routes(&mut self) -> Vec<RouteSegment> {
        self.run(RouteCategory::Main)
    }

    /// Trails linking every settlement to the road network.
    pub fn compute_trails(&mut self) -> Vec<RouteSegment> {
        self.run(RouteCategory::Trail)
    }

    /// Sea routes between ports sharing a water body.
    pub fn compute_sea_routes(&mut self) -> Vec<RouteSegment> {
        self.run(RouteCategory::Sea)
    }

    /// Reset density and run all planners in order.
    pub fn generate(&mut self) -> RouteNetwork {
        self.state.reset(self.map);
        let main = self.compute_main_routes();
        let trails = self.compute_trails();
        let sea = self.compute_sea_routes();
        RouteNetwork { main, trails, sea }
    }

    /// Clear `renderer`, regenerate the whole network and hand it over for
    /// drawing. Identical inputs produce identical networks.
    pub fn regenerate<R>(&mut self, renderer: &mut R) -> Result<RouteNetwork>
    where
        R: RouteRenderer + ?Sized,
    {
        renderer.clear();
        let network = self.generate();
        renderer.render(self.map, &network)?;
        Ok(network)
    }

    pub fn summary(&self, network: &RouteNetwork) -> NetworkSummary {
        NetworkSummary::new(network, &self.state)
    }

    fn run(&mut self, category: RouteCategory) -> Vec<RouteSegment> {
        let planner = select_planner(category, self.config);
        let started = Instant::now();

        let mut view = GraphView::new(self.map, &mut self.state);
        let segments = planner.plan(&mut view);

        info!(
            %category,
            segments = segments.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "route category generated"
        );
        segments
    }
}

/// Generate the full network for `map` with a fresh state.
pub fn generate_routes(map: &TerrainMap, config: RoutingConfig) -> Result<RouteNetwork> {
    let mut generator = RouteGenerator::new(map, config)?;
    Ok(generator.generate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Burg, Cell, MapBuilder, Point};

    /// Two capitals three cells apart on one landmass.
    fn corridor() -> TerrainMap {
        let mut builder = MapBuilder::new();
        for x in 0..4 {
            builder.add_cell(Cell::new(30, Point::new(x as f64, 0.0)).with_feature(1));
        }
        builder.connect(0, 1).connect(1, 2).connect(2, 3).add_feature(1, true);
        builder
            .add_burg(Burg::new(1, 0, Point::new(0.0, 0.0), 1).capital())
            .add_burg(Burg::new(2, 3, Point::new(3.0, 0.0), 1).capital());
        builder.build().expect("valid corridor")
    }

    #[test]
    fn generate_resets_previous_density() {
        let map = corridor();
        let mut generator = RouteGenerator::new(&map, RoutingConfig::default()).unwrap();

        let first = generator.generate();
        let density = generator.state().densities().to_vec();
        let second = generator.generate();

        assert_eq!(first, second);
        assert_eq!(generator.state().densities(), density.as_slice());
    }

    #[test]
    fn summary_counts_segments_and_density() {
        let map = corridor();
        let mut generator = RouteGenerator::new(&map, RoutingConfig::default()).unwrap();
        let network = generator.generate();
        let summary = generator.summary(&network);

        assert_eq!(summary.main_segments, 1);
        // the trail backbone runs along the main road and adds no segment
        assert_eq!(summary.trail_segments, 0);
        assert_eq!(summary.segment_cells, 4);
        assert_eq!(summary.cells_with_density, 4);
        // main road 5 everywhere, plus 1 on every cell the backbone walked past the end
        assert_eq!(generator.state().densities(), &[6, 6, 6, 5]);
        assert_eq!(summary.max_density, 6);
        assert_eq!(summary.total_density, 23);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let map = corridor();
        let mut config = RoutingConfig::default();
        config.restore_limit = 0;
        assert!(RouteGenerator::new(&map, config).is_err());
    }
}
