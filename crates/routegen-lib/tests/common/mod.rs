//! Common test utilities and fixture helpers.
//!
//! Worlds are drawn as ASCII grids: `#` land, `M` mountain, `.` water. Cells
//! are 4-connected, features are the connected same-medium regions in scan
//! order and coastline rings are derived from the layout.

use std::path::PathBuf;

use routegen_lib::{
    Burg, Cell, CellId, FeatureId, MapBuilder, Point, RouteSegment, TerrainMap,
};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Path to the small two-island world.
#[allow(dead_code)]
pub fn fixture_map_path() -> PathBuf {
    fixtures_dir().join("small_world.json")
}

#[allow(dead_code)]
pub fn load_fixture_map() -> TerrainMap {
    TerrainMap::from_path(&fixture_map_path()).expect("fixture loads")
}

enum Role {
    Town,
    Capital,
    Port { haven: (usize, usize) },
}

/// Declarative grid world used by scenario tests.
pub struct GridWorld {
    width: usize,
    height: usize,
    tiles: Vec<u8>,
    burgs: Vec<((usize, usize), Role)>,
    one_landmass: bool,
}

#[allow(dead_code)]
impl GridWorld {
    pub fn parse(layout: &str) -> Self {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        let width = rows[0].len();
        assert!(rows.iter().all(|row| row.len() == width), "ragged layout");

        Self {
            width,
            height: rows.len(),
            tiles: rows.iter().flat_map(|row| row.bytes()).collect(),
            burgs: Vec::new(),
            one_landmass: false,
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> CellId {
        y * self.width + x
    }

    pub fn town(mut self, x: usize, y: usize) -> Self {
        self.burgs.push(((x, y), Role::Town));
        self
    }

    pub fn capital(mut self, x: usize, y: usize) -> Self {
        self.burgs.push(((x, y), Role::Capital));
        self
    }

    pub fn port(mut self, x: usize, y: usize, haven: (usize, usize)) -> Self {
        self.burgs.push(((x, y), Role::Port { haven }));
        self
    }

    /// Tag every land cell with the same landmass even when water separates
    /// them, so planners must discover the gap by searching.
    pub fn one_landmass(mut self) -> Self {
        self.one_landmass = true;
        self
    }

    pub fn build(&self) -> TerrainMap {
        let features = self.features();
        let terrain = self.terrain();
        let mut builder = MapBuilder::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let id = self.cell(x, y);
                let height = match self.tiles[id] {
                    b'#' => 30,
                    b'M' => 80,
                    _ => 10,
                };
                builder.add_cell(
                    Cell::new(height, Point::new(x as f64, y as f64))
                        .with_terrain(terrain[id])
                        .with_feature(features[id]),
                );
            }
        }
        for id in 0..self.tiles.len() {
            for neighbor in self.neighbors(id) {
                builder.connect(id, neighbor);
            }
        }

        let mut seen = Vec::new();
        for (id, &feature) in features.iter().enumerate() {
            if !seen.contains(&feature) {
                seen.push(feature);
                builder.add_feature(feature, self.is_land(id));
            }
        }

        for (index, ((x, y), role)) in self.burgs.iter().enumerate() {
            let cell = self.cell(*x, *y);
            let burg = Burg::new(
                index as u32 + 1,
                cell,
                Point::new(*x as f64, *y as f64),
                features[cell],
            );
            let burg = match role {
                Role::Town => burg,
                Role::Capital => burg.capital(),
                Role::Port { haven } => {
                    let haven = self.cell(haven.0, haven.1);
                    if let Some(cell) = builder.cell_mut(cell) {
                        cell.haven = Some(haven);
                    }
                    burg.port_on(features[haven])
                }
            };
            builder.add_burg(burg);
        }

        builder.build().expect("grid world is valid")
    }

    fn is_land(&self, id: CellId) -> bool {
        self.tiles[id] != b'.'
    }

    /// Up, left, right, down.
    fn neighbors(&self, id: CellId) -> Vec<CellId> {
        let (x, y) = (id % self.width, id / self.width);
        let mut out = Vec::with_capacity(4);
        if y > 0 {
            out.push(id - self.width);
        }
        if x > 0 {
            out.push(id - 1);
        }
        if x + 1 < self.width {
            out.push(id + 1);
        }
        if y + 1 < self.height {
            out.push(id + self.width);
        }
        out
    }

    fn features(&self) -> Vec<FeatureId> {
        let mut features = vec![0; self.tiles.len()];
        let mut next = 1;
        for seed in 0..self.tiles.len() {
            if features[seed] != 0 {
                continue;
            }
            let land = self.is_land(seed);
            let mut stack = vec![seed];
            features[seed] = next;
            while let Some(id) = stack.pop() {
                for neighbor in self.neighbors(id) {
                    if features[neighbor] == 0 && self.is_land(neighbor) == land {
                        features[neighbor] = next;
                        stack.push(neighbor);
                    }
                }
            }
            next += 1;
        }
        if self.one_landmass {
            if let Some(first) = (0..self.tiles.len()).find(|&id| self.is_land(id)) {
                let landmass = features[first];
                for id in 0..self.tiles.len() {
                    if self.is_land(id) {
                        features[id] = landmass;
                    }
                }
            }
        }
        features
    }

    fn terrain(&self) -> Vec<i8> {
        let mut terrain = vec![0; self.tiles.len()];
        for id in 0..self.tiles.len() {
            let coastal = self
                .neighbors(id)
                .into_iter()
                .any(|neighbor| self.is_land(neighbor) != self.is_land(id));
            terrain[id] = match (self.is_land(id), coastal) {
                (true, true) => 1,
                (false, true) => -1,
                _ => 0,
            };
        }
        for id in 0..self.tiles.len() {
            if self.is_land(id) && terrain[id] == 0 {
                let second_ring = self
                    .neighbors(id)
                    .into_iter()
                    .any(|neighbor| terrain[neighbor] == 1);
                terrain[id] = if second_ring { 2 } else { 3 };
            }
        }
        terrain
    }
}

/// Panic unless every consecutive pair of cells in `segment` is adjacent.
#[allow(dead_code)]
pub fn assert_connected(map: &TerrainMap, segment: &RouteSegment) {
    assert!(segment.len() >= 2, "segment too short: {:?}", segment.cells);
    for pair in segment.cells.windows(2) {
        assert!(
            map.neighbors(pair[0]).contains(&pair[1]),
            "cells {} and {} are not adjacent in {:?}",
            pair[0],
            pair[1],
            segment.cells
        );
    }
}
