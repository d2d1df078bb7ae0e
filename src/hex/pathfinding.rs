//! A* pathfinding over the occupancy grid.

use super::coord::HexCoord;
use super::grid::HexGrid;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Hard cap on node expansions, matching the source's guard against
/// pathological searches on crowded boards.
const MAX_EXPANSIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    f_cost: i32,
    // Smaller insertion order wins ties, so the search explores in a
    // deterministic, insertion-stable manner regardless of hash order.
    order: usize,
    position: HexCoord,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; we want the lowest f_cost first, with
        // ties broken by earliest insertion order.
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds a path from `start` to `goal` on `grid`, treating every id in
/// `ignore` as if it were not occupying its hex (used so a unit can path
/// toward its own target without the target blocking the destination).
///
/// If `goal` is occupied by a unit not in `ignore`, replans toward the
/// nearest walkable-or-ignored neighbour of `goal` (ties broken by
/// distance to `start`). Returns `None` if no path exists or the search
/// exceeds [`MAX_EXPANSIONS`].
pub fn find_path(
    grid: &HexGrid,
    start: HexCoord,
    goal: HexCoord,
    ignore: &HashSet<String>,
) -> Option<Vec<HexCoord>> {
    if start == goal {
        return Some(vec![start]);
    }

    let actual_goal = resolve_goal(grid, start, goal, ignore)?;
    if actual_goal == start {
        return Some(vec![start]);
    }

    astar(grid, start, actual_goal, ignore)
}

fn resolve_goal(
    grid: &HexGrid,
    start: HexCoord,
    goal: HexCoord,
    ignore: &HashSet<String>,
) -> Option<HexCoord> {
    let occupied_by_blocker = grid
        .unit_at(goal)
        .map(|id| !ignore.contains(id))
        .unwrap_or(false);

    if !occupied_by_blocker {
        return Some(goal);
    }

    let mut candidates: Vec<HexCoord> = goal
        .neighbors()
        .into_iter()
        .filter(|&n| {
            grid.is_valid(n)
                && (grid
                    .unit_at(n)
                    .map(|id| ignore.contains(id))
                    .unwrap_or(true))
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|&c| (start.distance(c), c.q, c.r));
    Some(candidates[0])
}

fn astar(
    grid: &HexGrid,
    start: HexCoord,
    goal: HexCoord,
    ignore: &HashSet<String>,
) -> Option<Vec<HexCoord>> {
    let mut open = BinaryHeap::new();
    let mut g_costs: HashMap<HexCoord, i32> = HashMap::new();
    let mut parents: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut closed: HashSet<HexCoord> = HashSet::new();
    let mut order = 0usize;

    g_costs.insert(start, 0);
    open.push(PathNode {
        f_cost: start.distance(goal),
        order,
        position: start,
    });

    let mut expansions = 0usize;

    while let Some(node) = open.pop() {
        if closed.contains(&node.position) {
            continue;
        }
        if node.position == goal {
            return Some(reconstruct_path(&parents, start, goal));
        }

        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            return None;
        }
        closed.insert(node.position);

        let g = g_costs[&node.position];
        for neighbor in node.position.neighbors() {
            if closed.contains(&neighbor) {
                continue;
            }
            let passable = neighbor == goal
                || (grid.is_valid(neighbor)
                    && grid
                        .unit_at(neighbor)
                        .map(|id| ignore.contains(id))
                        .unwrap_or(true));
            if !passable {
                continue;
            }

            let tentative_g = g + 1;
            let better = g_costs
                .get(&neighbor)
                .map(|&existing| tentative_g < existing)
                .unwrap_or(true);
            if better {
                g_costs.insert(neighbor, tentative_g);
                parents.insert(neighbor, node.position);
                order += 1;
                open.push(PathNode {
                    f_cost: tentative_g + neighbor.distance(goal),
                    order,
                    position: neighbor,
                });
            }
        }
    }

    None
}

fn reconstruct_path(
    parents: &HashMap<HexCoord, HexCoord>,
    start: HexCoord,
    goal: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = parents[&current];
        path.push(current);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn straight_line_path_on_empty_grid() {
        let grid = HexGrid::new(7, 8);
        let ignore = HashSet::new();
        let path = find_path(&grid, HexCoord::new(0, 0), HexCoord::new(3, 0), &ignore).unwrap();
        assert_eq!(path.first(), Some(&HexCoord::new(0, 0)));
        assert_eq!(path.last(), Some(&HexCoord::new(3, 0)));
        // Steps must be contiguous.
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
    }

    #[test]
    fn occupied_goal_replans_to_nearest_free_neighbor() {
        let mut grid = HexGrid::new(7, 8);
        grid.place("blocker", HexCoord::new(3, 0)).unwrap();
        let ignore = HashSet::new();
        let path = find_path(&grid, HexCoord::new(0, 0), HexCoord::new(3, 0), &ignore).unwrap();
        let end = *path.last().unwrap();
        assert_ne!(end, HexCoord::new(3, 0));
        assert_eq!(end.distance(HexCoord::new(3, 0)), 1);
    }

    #[test]
    fn ignored_unit_does_not_block() {
        let mut grid = HexGrid::new(7, 8);
        grid.place("target", HexCoord::new(3, 0)).unwrap();
        let mut ignore = HashSet::new();
        ignore.insert("target".to_string());
        let path = find_path(&grid, HexCoord::new(0, 0), HexCoord::new(3, 0), &ignore).unwrap();
        assert_eq!(path.last(), Some(&HexCoord::new(3, 0)));
    }

    #[test]
    fn no_path_when_fully_boxed_in() {
        let mut grid = HexGrid::new(7, 8);
        let start = HexCoord::new(0, 3);
        for n in start.neighbors() {
            if grid.is_valid(n) {
                grid.place(&format!("wall-{n}"), n).ok();
            }
        }
        let ignore = HashSet::new();
        let path = find_path(&grid, start, HexCoord::new(5, 5), &ignore);
        assert!(path.is_none());
    }
}
