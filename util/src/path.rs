use std::{collections::VecDeque, hash::Hash};

use glam::IVec2;

use crate::{HashSet, DIR_4};

/// Generate a shortest paths map on a grid according to a neighbors function.
///
/// Nodes come out in breadth-first order paired with their step distance
/// from the nearest start node. Neighbor order is preserved, so the output
/// sequence is deterministic for a deterministic neighbors function.
pub fn dijkstra_map<'a, T, I>(
    mut neighbors: impl FnMut(&T) -> I + 'a,
    starts: impl IntoIterator<Item = T>,
) -> impl Iterator<Item = (T, usize)> + 'a
where
    T: Clone + Eq + Hash + 'a,
    I: IntoIterator<Item = T>,
{
    let mut edge: VecDeque<(T, usize)> =
        starts.into_iter().map(|s| (s, 0)).collect();
    let mut seen = HashSet::default();

    std::iter::from_fn(move || {
        // Candidates are consumed first-in, first-out, so the first time a
        // node is popped its length is the shortest one.
        while let Some((node, len)) = edge.pop_front() {
            if !seen.contains(&node) {
                seen.insert(node.clone());
                for n in neighbors(&node) {
                    edge.push_back((n, len + 1));
                }
                return Some((node, len));
            }
        }
        None
    })
}

/// Combinator for limiting flood fill to a given distance.
pub fn within_range<T>(n: usize) -> impl FnMut(&(T, usize)) -> bool {
    move |&(_, k)| k < n
}

/// Flood fill a grid along cardinal directions.
///
/// Start cells are always included, further cells only when `is_open`
/// accepts them.
pub fn flood_fill_4<'a>(
    is_open: &'a impl Fn(&IVec2) -> bool,
    starts: impl IntoIterator<Item = IVec2>,
) -> impl Iterator<Item = (IVec2, usize)> + 'a {
    dijkstra_map(
        move |&p: &IVec2| {
            DIR_4
                .iter()
                .map(move |&d| p + d)
                .filter(|q| is_open(q))
                .collect::<Vec<_>>()
        },
        starts,
    )
}

/// Find a shortest path between two points with A*.
///
/// The returned path includes both endpoints. Returns `None` if the
/// destination is unreachable.
pub fn astar_path<T, I>(
    start: &T,
    end: &T,
    mut neighbors: impl FnMut(&T) -> I,
    heuristic: impl Fn(&T, &T) -> usize,
) -> Option<Vec<T>>
where
    T: Clone + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    pathfinding::prelude::astar(
        start,
        |a| {
            neighbors(a)
                .into_iter()
                .map(|b| (b, 1usize))
                .collect::<Vec<_>>()
        },
        |a| heuristic(a, end),
        |a| a == end,
    )
    .map(|(path, _)| path)
}
