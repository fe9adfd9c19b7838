//! Tunable constants for route generation.
//!
//! Every field has a default matching the classic generator, so a config file
//! only needs to mention the values it changes.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::restore::RouteCategory;

/// How the frontier search treats a cell that is reached a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Predecessor and cost are fixed when a cell is first discovered.
    #[default]
    FirstDiscovery,
    /// Textbook Dijkstra: cheaper paths replace earlier ones until the cell is popped.
    Relaxed,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchMode::FirstDiscovery => "first_discovery",
            SearchMode::Relaxed => "relaxed",
        };
        f.write_str(value)
    }
}

/// Cost of entering a land cell by its coastline ring. Defaults are the
/// overland values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainCosts {
    pub coast: f64,
    pub second_ring: f64,
    pub interior: f64,
}

impl Default for TerrainCosts {
    fn default() -> Self {
        Self {
            coast: 10.0,
            second_ring: 50.0,
            interior: 40.0,
        }
    }
}

impl TerrainCosts {
    pub fn cost(&self, terrain: i8) -> f64 {
        match terrain {
            1 => self.coast,
            2 => self.second_ring,
            _ => self.interior,
        }
    }
}

/// Two-tier surcharge for hills and mountains, added on top of the height itself.
/// Defaults are the overland values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightPenalty {
    pub hill_height: u8,
    pub hill_penalty: f64,
    pub mountain_height: u8,
    pub mountain_penalty: f64,
}

impl Default for HeightPenalty {
    fn default() -> Self {
        Self {
            hill_height: 50,
            hill_penalty: 80.0,
            mountain_height: 70,
            mountain_penalty: 200.0,
        }
    }
}

impl HeightPenalty {
    pub fn cost(&self, height: u8) -> f64 {
        let surcharge = if height >= self.mountain_height {
            self.mountain_penalty
        } else if height >= self.hill_height {
            self.hill_penalty
        } else {
            0.0
        };
        f64::from(height) + surcharge
    }
}

/// Costs for the capital-to-capital and trail backbone search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlandCosts {
    pub terrain: TerrainCosts,
    pub height: HeightPenalty,
    /// Divisor applied when the destination already has a road or settlement.
    pub infrastructure_discount: f64,
}

impl Default for OverlandCosts {
    fn default() -> Self {
        Self {
            terrain: TerrainCosts::default(),
            height: HeightPenalty::default(),
            infrastructure_discount: 2.5,
        }
    }
}

/// Costs for the search from a settlement to the closest existing road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadSeekCosts {
    #[serde(deserialize_with = "road_seek_terrain")]
    pub terrain: TerrainCosts,
    #[serde(deserialize_with = "road_seek_height")]
    pub height: HeightPenalty,
    /// Bonus subtracted when the destination already has a road or settlement.
    /// The result saturates at zero.
    pub magnet_bonus: f64,
}

impl Default for RoadSeekCosts {
    fn default() -> Self {
        Self {
            terrain: TerrainCosts {
                coast: 10.0,
                second_ring: 50.0,
                interior: 100.0,
            },
            height: HeightPenalty {
                hill_height: 50,
                hill_penalty: 30.0,
                mountain_height: 70,
                mountain_penalty: 100.0,
            },
            magnet_bonus: 50.0,
        }
    }
}

/// Partial terrain block; missing values come from the enclosing defaults.
#[derive(Debug, Default, Deserialize)]
struct TerrainOverride {
    coast: Option<f64>,
    second_ring: Option<f64>,
    interior: Option<f64>,
}

impl TerrainOverride {
    fn apply(self, base: TerrainCosts) -> TerrainCosts {
        TerrainCosts {
            coast: self.coast.unwrap_or(base.coast),
            second_ring: self.second_ring.unwrap_or(base.second_ring),
            interior: self.interior.unwrap_or(base.interior),
        }
    }
}

/// Partial height block; missing values come from the enclosing defaults.
#[derive(Debug, Default, Deserialize)]
struct HeightOverride {
    hill_height: Option<u8>,
    hill_penalty: Option<f64>,
    mountain_height: Option<u8>,
    mountain_penalty: Option<f64>,
}

impl HeightOverride {
    fn apply(self, base: HeightPenalty) -> HeightPenalty {
        HeightPenalty {
            hill_height: self.hill_height.unwrap_or(base.hill_height),
            hill_penalty: self.hill_penalty.unwrap_or(base.hill_penalty),
            mountain_height: self.mountain_height.unwrap_or(base.mountain_height),
            mountain_penalty: self.mountain_penalty.unwrap_or(base.mountain_penalty),
        }
    }
}

fn road_seek_terrain<'de, D>(deserializer: D) -> std::result::Result<TerrainCosts, D::Error>
where
    D: Deserializer<'de>,
{
    let base = RoadSeekCosts::default().terrain;
    TerrainOverride::deserialize(deserializer).map(|patch| patch.apply(base))
}

fn road_seek_height<'de, D>(deserializer: D) -> std::result::Result<HeightPenalty, D::Error>
where
    D: Deserializer<'de>,
{
    let base = RoadSeekCosts::default().height;
    HeightOverride::deserialize(deserializer).map(|patch| patch.apply(base))
}

/// Costs for the two water searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaCosts {
    /// Multiplier on existing sea-route density for direct connections.
    pub density_penalty: f64,
    /// Penalty for unclassified open water (terrain class 0).
    pub open_water_penalty: f64,
    /// Penalty for coastal water rings.
    pub coastal_water_cost: f64,
    /// Flat cost of reusing an existing route in the indirect search.
    pub reuse_cost: f64,
}

impl Default for SeaCosts {
    fn default() -> Self {
        Self {
            density_penalty: 50.0,
            open_water_penalty: 100.0,
            coastal_water_cost: 1.0,
            reuse_cost: 1.0,
        }
    }
}

impl SeaCosts {
    pub fn terrain_penalty(&self, terrain: i8) -> f64 {
        if terrain == 0 {
            self.open_water_penalty
        } else {
            self.coastal_water_cost
        }
    }
}

/// Density added to each cell a restored path passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreIncrements {
    pub main: u32,
    pub trail: u32,
    pub sea: u32,
}

impl Default for ScoreIncrements {
    fn default() -> Self {
        Self {
            main: 5,
            trail: 1,
            sea: 1,
        }
    }
}

impl ScoreIncrements {
    pub fn for_category(&self, category: RouteCategory) -> u32 {
        match category {
            RouteCategory::Main => self.main,
            RouteCategory::Trail => self.trail,
            RouteCategory::Sea => self.sea,
        }
    }
}

/// Full configuration of a generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Cells lower than this are water.
    pub water_level: u8,
    pub search_mode: SearchMode,
    pub overland: OverlandCosts,
    pub road_seek: RoadSeekCosts,
    pub sea: SeaCosts,
    pub scores: ScoreIncrements,
    /// Ceiling on restoration steps. Longer routes are truncated with an error diagnostic.
    pub restore_limit: usize,
    /// Share of the final road density blended into cell suitability.
    pub suitability_factor: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            water_level: 20,
            search_mode: SearchMode::default(),
            overland: OverlandCosts::default(),
            road_seek: RoadSeekCosts::default(),
            sea: SeaCosts::default(),
            scores: ScoreIncrements::default(),
            restore_limit: 1000,
            suitability_factor: 0.5,
        }
    }
}

impl RoutingConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load and validate a configuration from any JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Reject values that would produce negative or undefined edge costs.
    pub fn validate(&self) -> Result<()> {
        if self.restore_limit == 0 {
            return Err(Error::invalid_config("restore_limit must be positive"));
        }

        let discount = self.overland.infrastructure_discount;
        if !discount.is_finite() || discount <= 0.0 {
            return Err(Error::invalid_config(format!(
                "infrastructure_discount must be finite and positive, got {discount}"
            )));
        }

        let costs = [
            ("overland.terrain.coast", self.overland.terrain.coast),
            ("overland.terrain.second_ring", self.overland.terrain.second_ring),
            ("overland.terrain.interior", self.overland.terrain.interior),
            ("overland.height.hill_penalty", self.overland.height.hill_penalty),
            ("overland.height.mountain_penalty", self.overland.height.mountain_penalty),
            ("road_seek.terrain.coast", self.road_seek.terrain.coast),
            ("road_seek.terrain.second_ring", self.road_seek.terrain.second_ring),
            ("road_seek.terrain.interior", self.road_seek.terrain.interior),
            ("road_seek.height.hill_penalty", self.road_seek.height.hill_penalty),
            ("road_seek.height.mountain_penalty", self.road_seek.height.mountain_penalty),
            ("road_seek.magnet_bonus", self.road_seek.magnet_bonus),
            ("sea.density_penalty", self.sea.density_penalty),
            ("sea.open_water_penalty", self.sea.open_water_penalty),
            ("sea.coastal_water_cost", self.sea.coastal_water_cost),
            ("sea.reuse_cost", self.sea.reuse_cost),
            ("suitability_factor", self.suitability_factor),
        ];
        if let Some((name, value)) = costs
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(Error::invalid_config(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_generator() {
        let config = RoutingConfig::default();
        assert_eq!(config.water_level, 20);
        assert_eq!(config.search_mode, SearchMode::FirstDiscovery);
        assert_eq!(config.restore_limit, 1000);
        assert_eq!(config.scores.for_category(RouteCategory::Main), 5);
        assert_eq!(config.scores.for_category(RouteCategory::Sea), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn height_penalty_has_two_tiers() {
        let penalty = OverlandCosts::default().height;
        assert_eq!(penalty.cost(40), 40.0);
        assert_eq!(penalty.cost(50), 130.0);
        assert_eq!(penalty.cost(69), 149.0);
        assert_eq!(penalty.cost(70), 270.0);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{ "search_mode": "relaxed", "scores": { "main": 7 } }"#;
        let config = RoutingConfig::from_reader(json.as_bytes()).expect("valid config");

        assert_eq!(config.search_mode, SearchMode::Relaxed);
        assert_eq!(config.scores.main, 7);
        assert_eq!(config.scores.trail, 1);
        assert_eq!(config.overland.infrastructure_discount, 2.5);
    }

    #[test]
    fn nested_cost_blocks_accept_partial_overrides() {
        let json = r#"{
            "overland": { "terrain": { "coast": 5 } },
            "road_seek": { "terrain": { "coast": 7 }, "height": { "hill_penalty": 12 } }
        }"#;
        let config = RoutingConfig::from_reader(json.as_bytes()).expect("valid config");

        assert_eq!(config.overland.terrain.coast, 5.0);
        assert_eq!(config.overland.terrain.interior, 40.0);
        assert_eq!(config.overland.height, HeightPenalty::default());

        assert_eq!(config.road_seek.terrain.coast, 7.0);
        assert_eq!(config.road_seek.terrain.interior, 100.0);
        assert_eq!(config.road_seek.height.hill_penalty, 12.0);
        assert_eq!(config.road_seek.height.mountain_penalty, 100.0);
        assert_eq!(config.road_seek.magnet_bonus, 50.0);
    }

    #[test]
    fn zero_discount_is_rejected() {
        let json = r#"{ "overland": { "infrastructure_discount": 0.0 } }"#;
        let error = RoutingConfig::from_reader(json.as_bytes()).expect_err("invalid");
        assert!(format!("{error}").contains("infrastructure_discount"));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut config = RoutingConfig::default();
        config.sea.reuse_cost = -1.0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
