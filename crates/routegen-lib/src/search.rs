//! Single-source frontier search over the cell graph.
//!
//! The engine expands cells in order of accumulated cost and records, for
//! every discovered cell, the cell it was reached from. Two modes exist:
//!
//! - [`SearchMode::FirstDiscovery`]: a cell's predecessor is locked the first
//!   time it is reached. A cheaper path found later is ignored. This matches
//!   the classic generator's output.
//! - [`SearchMode::Relaxed`]: Dijkstra with lazy deletion. Predecessors are
//!   replaced whenever a strictly cheaper total appears and become final when
//!   the cell is popped.
//!
//! Equal-cost frontier entries pop in insertion order, which keeps repeated
//! runs over the same input identical.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::SearchMode;
use crate::cost::{CostModel, EarlyStop};
use crate::graph::GraphView;
use crate::map::CellId;

/// Sentinel marking a cell that has no predecessor.
const UNVISITED: CellId = CellId::MAX;

/// Cell-to-predecessor mapping produced by one search.
///
/// Backed by a dense array sized to the map so lookups never hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredecessorMap {
    from: Vec<CellId>,
}

impl PredecessorMap {
    pub fn new(cell_count: usize) -> Self {
        Self {
            from: vec![UNVISITED; cell_count],
        }
    }

    /// Predecessor of `cell`, if it was discovered from another cell.
    pub fn get(&self, cell: CellId) -> Option<CellId> {
        match self.from.get(cell) {
            Some(&from) if from != UNVISITED => Some(from),
            _ => None,
        }
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.get(cell).is_some()
    }

    /// Record that `cell` is reached from `from`.
    pub fn set(&mut self, cell: CellId, from: CellId) {
        if let Some(slot) = self.from.get_mut(cell) {
            *slot = from;
        }
    }

    /// Number of cells with a predecessor.
    pub fn len(&self) -> usize {
        self.from.iter().filter(|&&from| from != UNVISITED).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether following predecessors from `cell` arrives at `start`.
    pub fn reaches(&self, cell: CellId, start: CellId) -> bool {
        let mut current = cell;
        for _ in 0..=self.from.len() {
            if current == start {
                return true;
            }
            match self.get(current) {
                Some(previous) => current = previous,
                None => return false,
            }
        }
        false
    }
}

/// Result of one search call.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub predecessors: PredecessorMap,
    /// Cell that triggered the early stop: the target, or the first road
    /// reached by a road-seeking search.
    pub exit: Option<CellId>,
    /// Number of frontier pops performed.
    pub expanded: usize,
}

/// Run a search from `start` under `model`.
pub fn search<M: CostModel + ?Sized>(
    view: &GraphView<'_>,
    start: CellId,
    model: &M,
    mode: SearchMode,
) -> SearchOutcome {
    let cell_count = view.cell_count();
    let stop = model.early_stop();
    let mut predecessors = PredecessorMap::new(cell_count);
    let mut cost = vec![f64::INFINITY; cell_count];
    let mut frontier = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expanded = 0usize;

    let finish = |predecessors, exit, expanded| SearchOutcome {
        predecessors,
        exit,
        expanded,
    };

    if stop == EarlyStop::Target(start) {
        return finish(predecessors, Some(start), expanded);
    }

    cost[start] = 0.0;
    frontier.push(QueueEntry::new(start, 0.0, sequence));

    while let Some(entry) = frontier.pop() {
        let current = entry.node;
        let accumulated = entry.cost.0;
        if mode == SearchMode::Relaxed && accumulated > cost[current] {
            continue;
        }
        expanded += 1;

        match stop {
            EarlyStop::ExistingRoad if view.has_density(current) => {
                return finish(predecessors, Some(current), expanded);
            }
            EarlyStop::Target(target) if mode == SearchMode::Relaxed && current == target => {
                return finish(predecessors, Some(current), expanded);
            }
            _ => {}
        }

        for &next in view.neighbors(current) {
            if stop == EarlyStop::TargetAdjacent(next) {
                predecessors.set(next, current);
                return finish(predecessors, Some(next), expanded);
            }

            let Some(step) = model.edge_cost(view, current, next) else {
                continue;
            };
            let total = accumulated + step;

            match mode {
                SearchMode::FirstDiscovery => {
                    if predecessors.contains(next) || total >= cost[next] {
                        continue;
                    }
                    predecessors.set(next, current);
                    if stop == EarlyStop::Target(next) {
                        return finish(predecessors, Some(next), expanded);
                    }
                    cost[next] = total;
                }
                SearchMode::Relaxed => {
                    if total >= cost[next] {
                        continue;
                    }
                    predecessors.set(next, current);
                    cost[next] = total;
                }
            }

            sequence += 1;
            frontier.push(QueueEntry::new(next, total, sequence));
        }
    }

    finish(predecessors, None, expanded)
}

#[derive(Copy, Clone, Debug)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: CellId,
    cost: FloatOrd,
    sequence: u64,
}

impl QueueEntry {
    fn new(node: CellId, cost: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            sequence,
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, oldest first on ties.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
