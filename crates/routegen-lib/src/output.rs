use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::map::{CellId, TerrainMap};
use crate::restore::{RouteCategory, RouteSegment};
use crate::routing::RouteNetwork;

/// Interpolation the drawing layer should apply to a category's polylines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveHint {
    CatmullRom { alpha: f64 },
    Bundle { beta: f64 },
}

impl CurveHint {
    pub fn for_category(category: RouteCategory) -> Self {
        match category {
            RouteCategory::Main | RouteCategory::Trail => CurveHint::CatmullRom { alpha: 0.1 },
            RouteCategory::Sea => CurveHint::Bundle { beta: 1.0 },
        }
    }
}

/// One drawable route segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    /// Stable identifier, unique within a pass (`road3`, `trail0`, `searoute12`).
    pub id: String,
    pub cells: Vec<CellId>,
    /// Anchor coordinates rounded to one decimal.
    pub points: Vec<[f64; 2]>,
}

impl Polyline {
    fn from_segment(map: &TerrainMap, index: usize, segment: &RouteSegment) -> Self {
        let points = segment
            .cells
            .iter()
            .map(|&cell| {
                let point = map.anchor_point(cell);
                [round_tenth(point.x), round_tenth(point.y)]
            })
            .collect();
        Self {
            id: format!("{}{}", segment.category.id_prefix(), index),
            cells: segment.cells.clone(),
            points,
        }
    }

    /// Straight-line SVG path data (`M x,y L x,y ...`).
    pub fn path_data(&self) -> String {
        let mut buffer = String::new();
        for (index, [x, y]) in self.points.iter().enumerate() {
            let command = if index == 0 { 'M' } else { 'L' };
            let _ = write!(buffer, "{command}{x},{y}");
        }
        buffer
    }
}

/// All polylines of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLayer {
    pub category: RouteCategory,
    pub curve: CurveHint,
    pub paths: Vec<Polyline>,
}

/// Drawing instructions for a whole network, one layer per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub layers: Vec<RenderLayer>,
}

impl RenderPlan {
    pub fn build(map: &TerrainMap, network: &RouteNetwork) -> Self {
        let layers = [RouteCategory::Main, RouteCategory::Trail, RouteCategory::Sea]
            .into_iter()
            .map(|category| RenderLayer {
                category,
                curve: CurveHint::for_category(category),
                paths: network
                    .segments(category)
                    .iter()
                    .enumerate()
                    .map(|(index, segment)| Polyline::from_segment(map, index, segment))
                    .collect(),
            })
            .collect();
        Self { layers }
    }

    pub fn layer(&self, category: RouteCategory) -> Option<&RenderLayer> {
        self.layers.iter().find(|layer| layer.category == category)
    }

    pub fn path_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.paths.len()).sum()
    }

    /// One line per polyline: id followed by its path data.
    pub fn render_text(&self) -> String {
        let mut buffer = String::new();
        for layer in &self.layers {
            let _ = writeln!(buffer, "[{}] {} paths", layer.category, layer.paths.len());
            for path in &layer.paths {
                let _ = writeln!(buffer, "{} {}", path.id, path.path_data());
            }
        }
        buffer
    }
}

/// Drawing collaborator notified by [`crate::RouteGenerator::regenerate`].
pub trait RouteRenderer {
    /// Drop everything drawn by a previous pass.
    fn clear(&mut self);

    /// Draw a freshly generated network.
    fn render(&mut self, map: &TerrainMap, network: &RouteNetwork) -> Result<()>;
}

/// Renderer that keeps the latest [`RenderPlan`] in memory.
#[derive(Debug, Clone, Default)]
pub struct PolylineRenderer {
    plan: Option<RenderPlan>,
}

impl PolylineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> Option<&RenderPlan> {
        self.plan.as_ref()
    }

    pub fn into_plan(self) -> Option<RenderPlan> {
        self.plan
    }
}

impl RouteRenderer for PolylineRenderer {
    fn clear(&mut self) {
        self.plan = None;
    }

    fn render(&mut self, map: &TerrainMap, network: &RouteNetwork) -> Result<()> {
        self.plan = Some(RenderPlan::build(map, network));
        Ok(())
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
