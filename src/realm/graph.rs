// src/realm/graph.rs
use std::collections::BTreeMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::grid::Grid;

/// Граф соседства государств.
///
/// Узел `i` — государство с id `i`; вес ребра — длина общей границы
/// (число пар соседних тайлов разных владельцев). Рёбра добавляются в
/// порядке возрастания пар id, так что граф одинаков при одинаковом владении.
#[must_use]
pub fn build_realm_graph(grid: &Grid, owner: &[Option<u32>], realm_count: usize) -> UnGraph<u32, u32> {
    let mut graph = UnGraph::with_capacity(realm_count, realm_count * 2);
    for id in 0..realm_count {
        graph.add_node(id as u32);
    }

    let mut shared: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    for idx in 0..owner.len() {
        let Some(a) = owner[idx] else {
            continue;
        };
        // каждая пара тайлов считается один раз
        for n in grid.neighbors(idx).filter(|&n| n > idx) {
            if let Some(b) = owner[n]
                && a != b
            {
                *shared.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
    }

    for ((a, b), length) in shared {
        if (a as usize) < realm_count && (b as usize) < realm_count {
            graph.add_edge(NodeIndex::new(a as usize), NodeIndex::new(b as usize), length);
        }
    }
    graph
}

/// Соседи государства по возрастанию id
#[must_use]
pub fn realm_neighbors(graph: &UnGraph<u32, u32>, realm: u32) -> Vec<u32> {
    let node = NodeIndex::new(realm as usize);
    if graph.node_weight(node).is_none() {
        return Vec::new();
    }
    let mut ids: Vec<u32> = graph.neighbors(node).map(|n| graph[n]).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::testing::grid_from;

    #[test]
    fn shared_border_length_is_edge_weight() {
        // 0 0 1
        // 0 0 1
        // 2 2 2
        let grid = grid_from(&["###", "###", "###"]);
        let owner: Vec<Option<u32>> = [0, 0, 1, 0, 0, 1, 2, 2, 2].into_iter().map(Some).collect();
        let graph = build_realm_graph(&grid, &owner, 3);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        let weight = |a: usize, b: usize| {
            graph
                .find_edge(NodeIndex::new(a), NodeIndex::new(b))
                .map(|e| graph[e])
        };
        assert_eq!(weight(0, 1), Some(2));
        assert_eq!(weight(0, 2), Some(2));
        assert_eq!(weight(1, 2), Some(1));

        assert_eq!(realm_neighbors(&graph, 0), vec![1, 2]);
        assert_eq!(realm_neighbors(&graph, 2), vec![0, 1]);
    }

    #[test]
    fn ocean_separates_realms() {
        let grid = grid_from(&["#~#"]);
        let graph = build_realm_graph(&grid, &[Some(0), None, Some(1)], 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(realm_neighbors(&graph, 1).is_empty());
        assert!(realm_neighbors(&graph, 7).is_empty());
    }
}
