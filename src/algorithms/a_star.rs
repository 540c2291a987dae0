use crate::algorithms::common::{validate_endpoints, Path, PathfindingAlgorithm, SearchSpace};
use crate::error::Result;
use crate::grid::{Grid, Position};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Open set entry. `Ord` is reversed so `BinaryHeap` pops the lowest `f` first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry<N> {
    f: u32,
    h: u32,
    counter: u64,
    node: N,
}

impl<N: Eq> Ord for OpenEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower f, then lower h (closer to goal), then the most recent push.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| self.counter.cmp(&other.counter))
    }
}

impl<N: Eq> PartialOrd for OpenEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-node search state, keyed by node in the arena map.
#[derive(Clone, Copy, Debug)]
struct NodeRecord<N> {
    g: u32,
    h: u32,
    parent: Option<N>,
    closed: bool,
}

/// Best-first search over any [`SearchSpace`] with unit edge costs and a
/// Manhattan heuristic toward `goal`.
///
/// Stale heap entries are left in place and skipped when popped if their node
/// is already closed. A closed node is never reopened, which is sound because
/// the heuristic is consistent under unit costs.
///
/// Endpoints are assumed valid; see [`validate_endpoints`].
pub fn search<S: SearchSpace>(space: &S, start: Position, goal: Position) -> Option<Path> {
    if start == goal {
        return Some(Path::single(start));
    }

    let mut records: FxHashMap<S::Node, NodeRecord<S::Node>> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut counter: u64 = 0;
    let mut expanded: usize = 0;
    let mut successors = Vec::with_capacity(4);

    let origin = space.origin(start);
    let h = start.manhattan(&goal);
    records.insert(
        origin,
        NodeRecord {
            g: 0,
            h,
            parent: None,
            closed: false,
        },
    );
    open.push(OpenEntry {
        f: h,
        h,
        counter,
        node: origin,
    });

    while let Some(OpenEntry { node: current, .. }) = open.pop() {
        let g = match records.get_mut(&current) {
            Some(record) if !record.closed => {
                record.closed = true;
                record.g
            }
            _ => continue,
        };
        expanded += 1;

        if space.position(current) == goal {
            let path = reconstruct_path(space, &records, current);
            debug!(
                "A* reached {} at cost {} ({} expanded, {} discovered)",
                goal,
                path.cost(),
                expanded,
                records.len()
            );
            return Some(path);
        }

        successors.clear();
        space.successors(current, &mut successors);

        let tentative_g = g + 1;
        for &next in &successors {
            let improves = match records.get(&next) {
                Some(record) => !record.closed && tentative_g < record.g,
                None => true,
            };
            if !improves {
                continue;
            }

            let record = records.entry(next).or_insert_with(|| NodeRecord {
                g: u32::MAX,
                h: space.position(next).manhattan(&goal),
                parent: None,
                closed: false,
            });
            record.g = tentative_g;
            record.parent = Some(current);

            counter += 1;
            open.push(OpenEntry {
                f: tentative_g + record.h,
                h: record.h,
                counter,
                node: next,
            });
            trace!("push {:?} g={} h={}", next, tentative_g, record.h);
        }
    }

    debug!(
        "A* found no path from {} to {} ({} expanded)",
        start, goal, expanded
    );
    None
}

fn reconstruct_path<S: SearchSpace>(
    space: &S,
    records: &FxHashMap<S::Node, NodeRecord<S::Node>>,
    end: S::Node,
) -> Path {
    let mut cells = vec![space.position(end)];
    let mut current = end;
    while let Some(parent) = records.get(&current).and_then(|record| record.parent) {
        cells.push(space.position(parent));
        current = parent;
    }
    cells.reverse();
    Path::new(cells)
}

/// The grid seen as a static graph: nodes are positions, only static obstacles apply.
pub struct GridSpace<'a> {
    grid: &'a Grid,
}

impl<'a> GridSpace<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        GridSpace { grid }
    }
}

impl SearchSpace for GridSpace<'_> {
    type Node = Position;

    fn origin(&self, start: Position) -> Position {
        start
    }

    fn position(&self, node: Position) -> Position {
        node
    }

    fn successors(&self, node: Position, out: &mut Vec<Position>) {
        out.extend(self.grid.neighbors(node, None));
    }
}

/// A* over static obstacles. Any obstacle schedule on the grid is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct AStar;

impl AStar {
    pub fn new() -> Self {
        AStar
    }
}

impl PathfindingAlgorithm for AStar {
    fn find_path(&self, grid: &Grid, start: Position, goal: Position) -> Result<Option<Path>> {
        validate_endpoints(grid, start, goal, None)?;
        Ok(search(&GridSpace::new(grid), start, goal))
    }

    fn name(&self) -> &'static str {
        "a_star"
    }
}
