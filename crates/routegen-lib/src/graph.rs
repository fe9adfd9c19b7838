use serde::Serialize;

use crate::map::{CellId, Point, TerrainMap, NO_BURG};

/// Per-cell values that route generation is allowed to change.
///
/// Road density only ever grows during a pass; [`NetworkState::reset`] is the
/// single way back to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkState {
    density: Vec<u32>,
    suitability: Vec<f64>,
}

impl NetworkState {
    /// Fresh state for `map`: no density, suitability copied from the map.
    pub fn new(map: &TerrainMap) -> Self {
        Self {
            density: vec![0; map.cell_count()],
            suitability: map.cells().iter().map(|cell| cell.suitability).collect(),
        }
    }

    pub fn density(&self, cell: CellId) -> u32 {
        self.density[cell]
    }

    pub fn densities(&self) -> &[u32] {
        &self.density
    }

    pub fn suitability(&self, cell: CellId) -> f64 {
        self.suitability[cell]
    }

    pub fn suitabilities(&self) -> &[f64] {
        &self.suitability
    }

    /// Clear density and restore the map's suitability scores.
    pub fn reset(&mut self, map: &TerrainMap) {
        self.density.iter_mut().for_each(|value| *value = 0);
        for (value, cell) in self.suitability.iter_mut().zip(map.cells()) {
            *value = cell.suitability;
        }
    }

    pub(crate) fn add_density(&mut self, cell: CellId, amount: u32) {
        self.density[cell] = self.density[cell].saturating_add(amount);
    }

    /// Add `factor` times each cell's density to its suitability.
    pub(crate) fn blend_into_suitability(&mut self, factor: f64) {
        for (score, &density) in self.suitability.iter_mut().zip(&self.density) {
            *score += f64::from(density) * factor;
        }
    }
}

/// Read access to the terrain plus scoped write access to [`NetworkState`].
///
/// Searches borrow the view immutably; restoration borrows it mutably and can
/// only touch density through [`GraphView::add_density`].
#[derive(Debug)]
pub struct GraphView<'a> {
    map: &'a TerrainMap,
    state: &'a mut NetworkState,
}

impl<'a> GraphView<'a> {
    pub fn new(map: &'a TerrainMap, state: &'a mut NetworkState) -> Self {
        Self { map, state }
    }

    pub fn map(&self) -> &'a TerrainMap {
        self.map
    }

    pub fn state(&self) -> &NetworkState {
        self.state
    }

    pub fn cell_count(&self) -> usize {
        self.map.cell_count()
    }

    pub fn neighbors(&self, cell: CellId) -> &'a [CellId] {
        self.map.neighbors(cell)
    }

    pub fn position(&self, cell: CellId) -> Point {
        self.map.cell(cell).position
    }

    pub fn density(&self, cell: CellId) -> u32 {
        self.state.density(cell)
    }

    pub fn has_density(&self, cell: CellId) -> bool {
        self.state.density(cell) > 0
    }

    pub fn has_burg(&self, cell: CellId) -> bool {
        self.map.cell(cell).burg != NO_BURG
    }

    /// Road or settlement already present on the cell.
    pub fn has_infrastructure(&self, cell: CellId) -> bool {
        self.has_density(cell) || self.has_burg(cell)
    }

    pub fn distance_squared(&self, a: CellId, b: CellId) -> f64 {
        self.position(a).distance_squared(&self.position(b))
    }

    pub fn add_density(&mut self, cell: CellId, amount: u32) {
        self.state.add_density(cell, amount);
    }

    pub(crate) fn blend_into_suitability(&mut self, factor: f64) {
        self.state.blend_into_suitability(factor);
    }
}
