//! Routegen library entry points.
//!
//! This crate synthesises a transportation network over a terrain cell graph:
//! main roads between capitals, trails linking every settlement to those
//! roads, and sea routes between ports. Higher-level consumers (the CLI)
//! should only depend on the items exported here instead of reimplementing
//! behavior.
//!

#![deny(warnings)]

pub mod config;
pub mod cost;
pub mod error;
pub mod graph;
pub mod map;
pub mod output;
pub mod restore;
pub mod routing;
pub mod search;

pub use config::{RoutingConfig, SearchMode};
pub use cost::{CostModel, DirectWater, EarlyStop, IndirectWater, Overland, RoadSeeking};
pub use error::{Error, Result};
pub use graph::{GraphView, NetworkState};
pub use map::{Burg, BurgId, Cell, CellId, Feature, FeatureId, MapBuilder, Point, TerrainMap};
pub use output::{CurveHint, PolylineRenderer, RenderPlan, RouteRenderer};
pub use restore::{restore_path, Restoration, RouteCategory, RouteSegment, WalkStatus};
pub use routing::{
    generate_routes, select_planner, NetworkSummary, RouteGenerator, RouteNetwork, RoutePlanner,
};
pub use search::{search, PredecessorMap, SearchOutcome};
