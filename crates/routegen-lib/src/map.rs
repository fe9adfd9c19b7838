//! Terrain input model.
//!
//! A [`TerrainMap`] bundles everything the route generator reads but never
//! writes: cell geometry and adjacency, settlements (burgs), features and the
//! biome cost table. Maps are loaded from JSON or assembled with
//! [`MapBuilder`]; both paths run the same validation so planners can index
//! cells without bounds surprises.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Dense cell identifier (the cell's index in the map).
pub type CellId = usize;

/// Settlement identifier. Zero is reserved for "no settlement".
pub type BurgId = u32;

/// Landmass or water body identifier.
pub type FeatureId = u32;

/// Sentinel stored in [`Cell::burg`] when no settlement occupies the cell.
pub const NO_BURG: BurgId = 0;

/// Planar coordinates of a cell centre or settlement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A single terrain cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Height in the 0..=100 range; values below the water level are water.
    pub height: u8,
    /// Signed coastline distance: 1 coastal land, 2 second ring, -1 coastal
    /// water, 0 unclassified open water.
    #[serde(default)]
    pub terrain: i8,
    /// Index into the map's biome cost table.
    #[serde(default)]
    pub biome: usize,
    pub position: Point,
    pub neighbors: Vec<CellId>,
    /// Landmass or water body the cell belongs to.
    #[serde(default)]
    pub feature: FeatureId,
    #[serde(default)]
    pub burg: BurgId,
    /// Water cell a port on this cell docks at.
    #[serde(default)]
    pub haven: Option<CellId>,
    /// Settlement suitability score owned by the terrain scoring pass.
    #[serde(default)]
    pub suitability: f64,
}

impl Cell {
    /// Create an unconnected cell with default terrain attributes.
    pub fn new(height: u8, position: Point) -> Self {
        Self {
            height,
            terrain: 0,
            biome: 0,
            position,
            neighbors: Vec::new(),
            feature: 0,
            burg: NO_BURG,
            haven: None,
            suitability: 0.0,
        }
    }

    pub fn with_terrain(mut self, terrain: i8) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_biome(mut self, biome: usize) -> Self {
        self.biome = biome;
        self
    }

    pub fn with_feature(mut self, feature: FeatureId) -> Self {
        self.feature = feature;
        self
    }

    pub fn with_haven(mut self, haven: CellId) -> Self {
        self.haven = Some(haven);
        self
    }

    /// Whether the cell is land for the given water level.
    pub fn is_land(&self, water_level: u8) -> bool {
        self.height >= water_level
    }
}

/// A settlement placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burg {
    pub id: BurgId,
    pub cell: CellId,
    pub position: Point,
    #[serde(default)]
    pub capital: bool,
    /// Water body served by this settlement's port; 0 when it is not a port.
    #[serde(default)]
    pub port: FeatureId,
    /// Landmass the settlement stands on.
    pub feature: FeatureId,
    #[serde(default)]
    pub removed: bool,
}

impl Burg {
    pub fn new(id: BurgId, cell: CellId, position: Point, feature: FeatureId) -> Self {
        Self {
            id,
            cell,
            position,
            capital: false,
            port: 0,
            feature,
            removed: false,
        }
    }

    pub fn capital(mut self) -> Self {
        self.capital = true;
        self
    }

    pub fn port_on(mut self, water_body: FeatureId) -> Self {
        self.port = water_body;
        self
    }

    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }

    /// Real, non-deleted settlement.
    pub fn is_active(&self) -> bool {
        self.id != NO_BURG && !self.removed
    }

    pub fn is_port(&self) -> bool {
        self.port != 0
    }
}

/// A maximal connected region of land or water cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub land: bool,
}

/// On-disk layout of a terrain map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapFile {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub burgs: Vec<Burg>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub biome_costs: Vec<f64>,
}

/// Validated, read-only terrain graph with its settlements and features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MapFile", into = "MapFile")]
pub struct TerrainMap {
    cells: Vec<Cell>,
    burgs: Vec<Burg>,
    features: Vec<Feature>,
    biome_costs: Vec<f64>,
    burg_index: HashMap<BurgId, usize>,
}

impl TryFrom<MapFile> for TerrainMap {
    type Error = Error;

    fn try_from(file: MapFile) -> Result<Self> {
        TerrainMap::new(file.cells, file.burgs, file.features, file.biome_costs)
    }
}

impl From<TerrainMap> for MapFile {
    fn from(map: TerrainMap) -> Self {
        MapFile {
            cells: map.cells,
            burgs: map.burgs,
            features: map.features,
            biome_costs: map.biome_costs,
        }
    }
}

impl TerrainMap {
    /// Assemble and validate a map from its parts.
    pub fn new(
        cells: Vec<Cell>,
        burgs: Vec<Burg>,
        features: Vec<Feature>,
        biome_costs: Vec<f64>,
    ) -> Result<Self> {
        let burg_index = validate(&cells, &burgs, &features, &biome_costs)?;
        Ok(Self {
            cells,
            burgs,
            features,
            biome_costs,
            burg_index,
        })
    }

    /// Load a map from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MapNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        let map = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            cells = map.cell_count(),
            burgs = map.burgs.len(),
            "loaded terrain map"
        );
        Ok(map)
    }

    /// Load a map from any JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: MapFile = serde_json::from_reader(reader)?;
        Self::try_from(file)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell by id. Ids handed out by this map are always in range.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Cell by id for ids coming from outside the map.
    pub fn checked_cell(&self, id: CellId) -> Result<&Cell> {
        self.cells.get(id).ok_or(Error::UnknownCell { cell: id })
    }

    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        &self.cells[id].neighbors
    }

    /// All settlements in input order, including removed ones.
    pub fn burgs(&self) -> &[Burg] {
        &self.burgs
    }

    pub fn burg(&self, id: BurgId) -> Option<&Burg> {
        self.burg_index.get(&id).map(|&index| &self.burgs[index])
    }

    /// Settlements that take part in route generation, in input order.
    pub fn active_burgs(&self) -> impl Iterator<Item = &Burg> + '_ {
        self.burgs.iter().filter(|burg| burg.is_active())
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn land_features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter().filter(|feature| feature.land)
    }

    /// Travel cost of a biome. Biome ids are validated on construction.
    pub fn biome_cost(&self, biome: usize) -> f64 {
        self.biome_costs.get(biome).copied().unwrap_or(0.0)
    }

    /// Coordinates used when drawing a route through `id`: the settlement's
    /// position when one occupies the cell, otherwise the cell centre.
    pub fn anchor_point(&self, id: CellId) -> Point {
        let cell = &self.cells[id];
        self.burg(cell.burg)
            .map(|burg| burg.position)
            .unwrap_or(cell.position)
    }
}

fn validate(
    cells: &[Cell],
    burgs: &[Burg],
    features: &[Feature],
    biome_costs: &[f64],
) -> Result<HashMap<BurgId, usize>> {
    let count = cells.len();

    if let Some((index, cost)) = biome_costs
        .iter()
        .enumerate()
        .find(|(_, cost)| !cost.is_finite() || **cost < 0.0)
    {
        return Err(Error::invalid_map(format!(
            "biome {index} has invalid cost {cost}"
        )));
    }

    let feature_ids: HashSet<FeatureId> = features.iter().map(|feature| feature.id).collect();
    if feature_ids.len() != features.len() {
        return Err(Error::invalid_map("duplicate feature id"));
    }

    let mut burg_index = HashMap::with_capacity(burgs.len());
    for (index, burg) in burgs.iter().enumerate() {
        if burg_index.insert(burg.id, index).is_some() {
            return Err(Error::invalid_map(format!("duplicate burg id {}", burg.id)));
        }
        if burg.cell >= count {
            return Err(Error::invalid_map(format!(
                "burg {} references missing cell {}",
                burg.id, burg.cell
            )));
        }
        if !feature_ids.is_empty() && !feature_ids.contains(&burg.feature) {
            return Err(Error::invalid_map(format!(
                "burg {} references missing feature {}",
                burg.id, burg.feature
            )));
        }
    }

    for (id, cell) in cells.iter().enumerate() {
        if let Some(&neighbor) = cell.neighbors.iter().find(|&&n| n >= count || n == id) {
            return Err(Error::invalid_map(format!(
                "cell {id} has invalid neighbor {neighbor}"
            )));
        }
        if cell.biome >= biome_costs.len() && !biome_costs.is_empty() {
            return Err(Error::invalid_map(format!(
                "cell {id} references missing biome {}",
                cell.biome
            )));
        }
        if let Some(haven) = cell.haven {
            if haven >= count {
                return Err(Error::invalid_map(format!(
                    "cell {id} has haven {haven} outside the map"
                )));
            }
        }
        if cell.burg != NO_BURG && !burg_index.contains_key(&cell.burg) {
            return Err(Error::invalid_map(format!(
                "cell {id} references missing burg {}",
                cell.burg
            )));
        }
    }

    Ok(burg_index)
}

/// Incremental constructor for [`TerrainMap`].
///
/// Handy for synthetic worlds and tests: cells are appended in id order,
/// [`MapBuilder::connect`] keeps adjacency symmetric and adding a burg marks
/// its cell as occupied.
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    cells: Vec<Cell>,
    burgs: Vec<Burg>,
    features: Vec<Feature>,
    biome_costs: Vec<f64>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell and return its id.
    pub fn add_cell(&mut self, cell: Cell) -> CellId {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    /// Link two cells in both directions. Repeated links are ignored.
    pub fn connect(&mut self, a: CellId, b: CellId) -> &mut Self {
        if a < self.cells.len() && b < self.cells.len() && a != b {
            if !self.cells[a].neighbors.contains(&b) {
                self.cells[a].neighbors.push(b);
            }
            if !self.cells[b].neighbors.contains(&a) {
                self.cells[b].neighbors.push(a);
            }
        }
        self
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id)
    }

    /// Place a settlement and mark its cell as occupied.
    pub fn add_burg(&mut self, burg: Burg) -> &mut Self {
        if let Some(cell) = self.cells.get_mut(burg.cell) {
            cell.burg = burg.id;
        }
        self.burgs.push(burg);
        self
    }

    pub fn add_feature(&mut self, id: FeatureId, land: bool) -> &mut Self {
        self.features.push(Feature { id, land });
        self
    }

    pub fn biome_costs(&mut self, costs: Vec<f64>) -> &mut Self {
        self.biome_costs = costs;
        self
    }

    pub fn build(&self) -> Result<TerrainMap> {
        TerrainMap::new(
            self.cells.clone(),
            self.burgs.clone(),
            self.features.clone(),
            self.biome_costs.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cell_builder() -> MapBuilder {
        let mut builder = MapBuilder::new();
        let a = builder.add_cell(Cell::new(30, Point::new(0.0, 0.0)).with_feature(1));
        let b = builder.add_cell(Cell::new(30, Point::new(1.0, 0.0)).with_feature(1));
        builder.connect(a, b).add_feature(1, true);
        builder
    }

    #[test]
    fn builder_links_cells_symmetrically() {
        let map = two_cell_builder().build().expect("valid map");
        assert_eq!(map.neighbors(0), &[1]);
        assert_eq!(map.neighbors(1), &[0]);
    }

    #[test]
    fn adding_burg_marks_cell() {
        let mut builder = two_cell_builder();
        builder.add_burg(Burg::new(7, 1, Point::new(1.2, 0.1), 1));
        let map = builder.build().expect("valid map");

        assert_eq!(map.cell(1).burg, 7);
        assert_eq!(map.anchor_point(1), Point::new(1.2, 0.1));
        assert_eq!(map.anchor_point(0), Point::new(0.0, 0.0));
    }

    #[test]
    fn dangling_neighbor_is_rejected() {
        let mut builder = two_cell_builder();
        builder.cell_mut(0).unwrap().neighbors.push(9);
        let error = builder.build().expect_err("dangling neighbor");
        assert!(format!("{error}").contains("invalid neighbor 9"));
    }

    #[test]
    fn negative_biome_cost_is_rejected() {
        let mut builder = two_cell_builder();
        builder.biome_costs(vec![10.0, -1.0]);
        let error = builder.build().expect_err("negative biome cost");
        assert!(matches!(error, Error::InvalidMap { .. }));
    }

    #[test]
    fn burg_on_unknown_feature_is_rejected() {
        let mut builder = two_cell_builder();
        builder.add_burg(Burg::new(1, 0, Point::default(), 5));
        assert!(builder.build().is_err());
    }

    #[test]
    fn reserved_burg_id_is_inactive() {
        let placeholder = Burg::new(NO_BURG, 0, Point::default(), 1);
        assert!(!placeholder.is_active());
        assert!(!Burg::new(3, 0, Point::default(), 1).removed().is_active());
    }

    #[test]
    fn json_round_trip_preserves_map() {
        let mut builder = two_cell_builder();
        builder.add_burg(Burg::new(1, 0, Point::new(0.0, 0.0), 1).capital());
        let map = builder.build().expect("valid map");

        let json = serde_json::to_string(&map).expect("serialise");
        let parsed = TerrainMap::from_reader(json.as_bytes()).expect("parse");
        assert_eq!(parsed.cells(), map.cells());
        assert_eq!(parsed.burg(1), map.burg(1));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = TerrainMap::from_path(Path::new("/nonexistent/world.json"))
            .expect_err("missing file");
        assert!(matches!(error, Error::MapNotFound { .. }));
    }
}
