//! Region analysis around the Übersquadrat: edge completion and hole detection.

use crate::grid::{layer_distance, neighbors4, scan_region};
use crate::models::{BaseRegion, Direction, SquareKey, VisitedSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Coverage of the row or column just outside one side of the Übersquadrat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAnalysis {
    pub direction: Direction,
    pub squares: Vec<SquareKey>,
    pub visited_count: usize,
    pub unvisited_count: usize,
    pub completion_pct: f64,
    /// Every square on this edge is visited; the region can grow this way
    pub can_expand: bool,
}

/// Edge analyses in N, S, E, W order.
pub fn analyze_edges(base: &BaseRegion, visited: &VisitedSet) -> [EdgeAnalysis; 4] {
    Direction::ALL.map(|direction| analyze_edge(direction, base, visited))
}

fn analyze_edge(direction: Direction, base: &BaseRegion, visited: &VisitedSet) -> EdgeAnalysis {
    // A side at the end of the key range has no ring beyond it
    let row = |i: Option<i32>| -> Vec<SquareKey> {
        i.into_iter()
            .flat_map(|i| (base.min_j..=base.max_j).map(move |j| SquareKey::new(i, j)))
            .collect()
    };
    let column = |j: Option<i32>| -> Vec<SquareKey> {
        j.into_iter()
            .flat_map(|j| (base.min_i..=base.max_i).map(move |i| SquareKey::new(i, j)))
            .collect()
    };
    let squares = match direction {
        Direction::North => row(base.max_i.checked_add(1)),
        Direction::South => row(base.min_i.checked_sub(1)),
        Direction::East => column(base.max_j.checked_add(1)),
        Direction::West => column(base.min_j.checked_sub(1)),
    };

    let visited_count = squares.iter().filter(|key| visited.contains(key)).count();
    let unvisited_count = squares.len() - visited_count;
    let completion_pct = if squares.is_empty() {
        0.0
    } else {
        visited_count as f64 / squares.len() as f64 * 100.0
    };

    EdgeAnalysis {
        direction,
        squares,
        visited_count,
        unvisited_count,
        completion_pct,
        can_expand: unvisited_count == 0,
    }
}

/// Completion of the given edge from a precomputed N, S, E, W array.
pub fn edge_completion(edges: &[EdgeAnalysis; 4], direction: Direction) -> f64 {
    edges
        .iter()
        .find(|edge| edge.direction == direction)
        .map(|edge| edge.completion_pct)
        .unwrap_or(0.0)
}

/// Bounds on the hole flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodFillLimits {
    /// Layers around the Übersquadrat included in the search window
    pub search_radius: i32,
    /// Squares that may be dequeued in total before the scan gives up
    pub max_cells: usize,
}

impl Default for FloodFillLimits {
    fn default() -> Self {
        Self {
            search_radius: 5,
            max_cells: 20_000,
        }
    }
}

/// A connected group of unvisited squares small enough to be worth filling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub id: usize,
    pub squares: Vec<SquareKey>,
    pub size: usize,
    pub avg_layer_distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleAnalysis {
    pub holes: Vec<Hole>,
    /// Retained holes only
    #[serde(skip)]
    pub square_to_hole: HashMap<SquareKey, usize>,
    /// Components larger than the size limit
    pub discarded_components: usize,
    /// Scan stopped at `FloodFillLimits::max_cells`
    pub truncated: bool,
}

impl HoleAnalysis {
    pub fn hole_of(&self, key: SquareKey) -> Option<&Hole> {
        self.square_to_hole
            .get(&key)
            .and_then(|id| self.holes.get(*id))
    }
}

/// Find 4-connected unvisited components around `base` of at most `max_hole_size` squares.
///
/// Squares inside the Übersquadrat count as covered. Components are discovered
/// in row-major order of the search window, so ids are stable for fixed input.
pub fn detect_holes(
    base: &BaseRegion,
    visited: &VisitedSet,
    max_hole_size: usize,
    limits: FloodFillLimits,
) -> HoleAnalysis {
    let window = base.expanded(limits.search_radius.max(0));
    let is_open = |key: SquareKey| {
        window.contains(key) && !base.contains(key) && !visited.contains(&key)
    };

    let mut analysis = HoleAnalysis::default();
    let mut seen: HashSet<SquareKey> = HashSet::new();
    let mut dequeued = 0usize;

    'scan: for seed in scan_region(&window) {
        if seen.contains(&seed) || !is_open(seed) {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::from([seed]);
        seen.insert(seed);

        while let Some(current) = queue.pop_front() {
            if dequeued >= limits.max_cells {
                analysis.truncated = true;
                break 'scan;
            }
            dequeued += 1;
            component.push(current);

            for neighbor in neighbors4(current) {
                if is_open(neighbor) && seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        if component.len() > max_hole_size {
            analysis.discarded_components += 1;
            continue;
        }

        let id = analysis.holes.len();
        let layer_sum: u32 = component
            .iter()
            .map(|key| layer_distance(*key, base).total)
            .sum();
        for key in &component {
            analysis.square_to_hole.insert(*key, id);
        }
        analysis.holes.push(Hole {
            id,
            size: component.len(),
            avg_layer_distance: layer_sum as f64 / component.len() as f64,
            squares: component,
        });
    }

    if analysis.truncated {
        warn!(
            max_cells = limits.max_cells,
            holes = analysis.holes.len(),
            "hole flood fill truncated"
        );
    } else {
        debug!(
            holes = analysis.holes.len(),
            discarded = analysis.discarded_components,
            "hole detection complete"
        );
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseRegion {
        BaseRegion::new(0, 3, 0, 3).unwrap()
    }

    fn ring_visited(base: &BaseRegion, radius: i32) -> VisitedSet {
        scan_region(&base.expanded(radius))
            .filter(|key| !base.contains(*key))
            .collect()
    }

    #[test]
    fn empty_visited_set_gives_zero_completion() {
        let edges = analyze_edges(&base(), &VisitedSet::new());
        for edge in &edges {
            assert_eq!(edge.squares.len(), 4);
            assert_eq!(edge.visited_count, 0);
            assert_eq!(edge.completion_pct, 0.0);
            assert!(!edge.can_expand);
        }
        assert_eq!(edges[0].direction, Direction::North);
        assert_eq!(edges[0].squares[0], SquareKey::new(4, 0));
        assert_eq!(edges[3].squares[0], SquareKey::new(0, -1));
    }

    #[test]
    fn completed_edge_can_expand() {
        let base = base();
        let mut visited: VisitedSet = (0..=3).map(|j| SquareKey::new(4, j)).collect();
        visited.insert(SquareKey::new(0, 4));
        let edges = analyze_edges(&base, &visited);

        assert!(edges[0].can_expand);
        assert_eq!(edges[0].completion_pct, 100.0);
        assert_eq!(edge_completion(&edges, Direction::East), 25.0);
        assert!(!edges[2].can_expand);
        assert_eq!(edges[2].unvisited_count, 3);
    }

    #[test]
    fn isolated_unvisited_cell_is_a_hole_of_size_one() {
        let base = base();
        let mut visited = ring_visited(&base, 5);
        let gap = SquareKey::new(5, 1);
        visited.remove(&gap);

        let analysis = detect_holes(&base, &visited, 10, FloodFillLimits::default());
        assert_eq!(analysis.holes.len(), 1);
        assert_eq!(analysis.holes[0].size, 1);
        assert_eq!(analysis.holes[0].squares, vec![gap]);
        assert_eq!(analysis.holes[0].avg_layer_distance, 1.0);
        assert_eq!(analysis.hole_of(gap).map(|hole| hole.id), Some(0));
    }

    #[test]
    fn oversized_components_are_excluded_from_map() {
        let base = base();
        let mut visited = ring_visited(&base, 5);
        // A 2x2 block and a single cell
        for key in [
            SquareKey::new(-2, 0),
            SquareKey::new(-2, 1),
            SquareKey::new(-3, 0),
            SquareKey::new(-3, 1),
            SquareKey::new(1, 6),
        ] {
            visited.remove(&key);
        }

        let analysis = detect_holes(&base, &visited, 3, FloodFillLimits::default());
        assert_eq!(analysis.holes.len(), 1);
        assert_eq!(analysis.discarded_components, 1);
        assert!(analysis.hole_of(SquareKey::new(-2, 0)).is_none());
        assert!(analysis.hole_of(SquareKey::new(1, 6)).is_some());
    }

    #[test]
    fn hole_ids_follow_row_major_discovery() {
        let base = base();
        let mut visited = ring_visited(&base, 5);
        let low = SquareKey::new(-3, 2);
        let high = SquareKey::new(6, 0);
        visited.remove(&high);
        visited.remove(&low);

        let analysis = detect_holes(&base, &visited, 5, FloodFillLimits::default());
        assert_eq!(analysis.square_to_hole[&low], 0);
        assert_eq!(analysis.square_to_hole[&high], 1);
    }

    #[test]
    fn open_wilderness_is_not_a_hole() {
        let analysis = detect_holes(&base(), &VisitedSet::new(), 10, FloodFillLimits::default());
        assert!(analysis.holes.is_empty());
        assert_eq!(analysis.discarded_components, 1);
        assert!(analysis.square_to_hole.is_empty());
    }

    #[test]
    fn flood_fill_respects_cell_bound() {
        let limits = FloodFillLimits {
            search_radius: 5,
            max_cells: 10,
        };
        let analysis = detect_holes(&base(), &VisitedSet::new(), 1000, limits);
        assert!(analysis.truncated);
        assert!(analysis.holes.is_empty());
    }
}
