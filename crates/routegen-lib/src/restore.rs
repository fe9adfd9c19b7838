//! Turning predecessor chains into drawable route segments.
//!
//! Restoration walks a [`PredecessorMap`] backwards from the path's end to its
//! start. Cells that already carry density are junctions: they split the walk
//! into separate segments so existing roads are not drawn twice. Every cell
//! the walk touches gains density, which later searches read as "road here".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::GraphView;
use crate::map::CellId;
use crate::search::PredecessorMap;

/// Kind of route a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCategory {
    /// Roads between capitals.
    Main,
    /// Paths linking the remaining settlements to the road network.
    Trail,
    /// Shipping lanes between ports.
    Sea,
}

impl RouteCategory {
    /// Prefix of stable segment identifiers for this category.
    pub fn id_prefix(self) -> &'static str {
        match self {
            RouteCategory::Main => "road",
            RouteCategory::Trail => "trail",
            RouteCategory::Sea => "searoute",
        }
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteCategory::Main => "main",
            RouteCategory::Trail => "trail",
            RouteCategory::Sea => "sea",
        };
        f.write_str(value)
    }
}

/// An ordered run of at least two cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSegment {
    pub category: RouteCategory,
    pub cells: Vec<CellId>,
}

impl RouteSegment {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn first(&self) -> Option<CellId> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<CellId> {
        self.cells.last().copied()
    }
}

/// How a restoration walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    ReachedStart,
    /// A cell without predecessor was hit before the start.
    DeadEnd,
    /// The step ceiling was hit before the start. Either the route is longer
    /// than the ceiling or the predecessor map contains a cycle.
    LimitExceeded,
}

/// Segments produced by one walk together with how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restoration {
    pub segments: Vec<RouteSegment>,
    pub status: WalkStatus,
}

/// State of the backward walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    /// Collecting a run of new cells; never empty.
    Free(Vec<CellId>),
    /// Standing on existing infrastructure; nothing is being collected.
    AtJunction(CellId),
}

impl WalkState {
    /// Initial state for a walk ending at `end`.
    pub fn start(end: CellId, end_is_junction: bool, category: RouteCategory) -> Self {
        if category == RouteCategory::Sea || !end_is_junction {
            WalkState::Free(vec![end])
        } else {
            WalkState::AtJunction(end)
        }
    }

    /// Step onto `cell`. Returns the segment closed by reaching a junction.
    pub fn advance(&mut self, cell: CellId, is_junction: bool) -> Option<Vec<CellId>> {
        if let WalkState::Free(run) = self {
            run.push(cell);
            if !is_junction {
                return None;
            }
            let closed = std::mem::take(run);
            *self = WalkState::AtJunction(cell);
            return Some(closed);
        }

        if let WalkState::AtJunction(junction) = *self {
            *self = if is_junction {
                WalkState::AtJunction(cell)
            } else {
                WalkState::Free(vec![junction, cell])
            };
        }
        None
    }

    /// The run still open when the walk stops.
    pub fn into_open_run(self) -> Option<Vec<CellId>> {
        match self {
            WalkState::Free(run) => Some(run),
            WalkState::AtJunction(_) => None,
        }
    }
}

/// Walk `predecessors` from `end` back to `start`, emitting segments of
/// `category` and adding `score` density to every cell passed.
///
/// A closed segment bumps its junction (unless it is `start`) and its origin
/// (unless it is `end`) once more. At most `limit` steps are taken; if the
/// ceiling is hit the partial result comes back with
/// [`WalkStatus::LimitExceeded`].
pub fn restore_path(
    view: &mut GraphView<'_>,
    predecessors: &PredecessorMap,
    start: CellId,
    end: CellId,
    category: RouteCategory,
    score: u32,
    limit: usize,
) -> Restoration {
    let end_is_junction = view.has_density(end);
    let mut state = WalkState::start(end, end_is_junction, category);
    if !end_is_junction {
        view.add_density(end, score);
    }

    let mut segments = Vec::new();
    let mut push = |cells: Vec<CellId>| {
        if cells.len() >= 2 {
            segments.push(RouteSegment { category, cells });
        }
    };

    let mut status = if start == end {
        WalkStatus::ReachedStart
    } else {
        WalkStatus::LimitExceeded
    };
    let mut current = end;
    let steps = if start == end { 0 } else { limit };

    for _ in 0..steps {
        let Some(previous) = predecessors.get(current) else {
            status = WalkStatus::DeadEnd;
            break;
        };
        current = previous;

        let is_junction = view.has_density(current);
        if let Some(closed) = state.advance(current, is_junction) {
            if closed[0] != end {
                view.add_density(closed[0], score);
            }
            if current != start {
                view.add_density(current, score);
            }
            push(closed);
        }

        view.add_density(current, score);
        if current == start {
            status = WalkStatus::ReachedStart;
            break;
        }
    }

    if let Some(run) = state.into_open_run() {
        push(run);
    }

    Restoration { segments, status }
}
