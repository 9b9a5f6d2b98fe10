use super::ids::NodeId;
use super::molecular::MolecularGraph;
use slotmap::SecondaryMap;
use std::collections::{HashSet, VecDeque};

/// Finds every bridge of the graph with an iterative Tarjan search.
///
/// Each bridge is returned as `(parent, child)` in depth-first order from
/// the first node of every component.
pub fn bridges(graph: &MolecularGraph) -> Vec<(NodeId, NodeId)> {
    let mut discovery: SecondaryMap<NodeId, usize> = SecondaryMap::new();
    let mut low: SecondaryMap<NodeId, usize> = SecondaryMap::new();
    let mut timer = 0;
    let mut found = Vec::new();

    for root in graph.node_ids() {
        if discovery.contains_key(root) {
            continue;
        }
        discovery.insert(root, timer);
        low.insert(root, timer);
        timer += 1;

        // (node, parent, index of next neighbor to visit)
        let mut stack: Vec<(NodeId, Option<NodeId>, usize)> = vec![(root, None, 0)];
        while let Some(frame) = stack.last_mut() {
            let (u, parent, next) = *frame;
            match graph.neighbors(u).get(next) {
                Some(&v) => {
                    frame.2 += 1;
                    if Some(v) == parent {
                        continue;
                    }
                    match discovery.get(v).copied() {
                        Some(seen) => low[u] = low[u].min(seen),
                        None => {
                            discovery.insert(v, timer);
                            low.insert(v, timer);
                            timer += 1;
                            stack.push((v, Some(u), 0));
                        }
                    }
                }
                None => {
                    stack.pop();
                    if let Some(p) = parent {
                        low[p] = low[p].min(low[u]);
                        if low[u] > discovery[p] {
                            found.push((p, u));
                        }
                    }
                }
            }
        }
    }
    found
}

/// Nodes reachable from `start` without crossing the edge `start - across`.
pub fn side_of(graph: &MolecularGraph, start: NodeId, across: NodeId) -> HashSet<NodeId> {
    let mut seen = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(u) = stack.pop() {
        for &v in graph.neighbors(u) {
            if u == start && v == across {
                continue;
            }
            if seen.insert(v) {
                stack.push(v);
            }
        }
    }
    seen
}

/// Splits the graph at the edge `(a, b)`: the first set holds `a`'s side,
/// the second `b`'s. On a bridge the two sets are disjoint.
pub fn split_at_bridge(
    graph: &MolecularGraph,
    (a, b): (NodeId, NodeId),
) -> (HashSet<NodeId>, HashSet<NodeId>) {
    (side_of(graph, a, b), side_of(graph, b, a))
}

/// Connected components, treating `excluded` nodes as absent.
///
/// Components are ordered by their first node in insertion order.
pub fn connected_components(
    graph: &MolecularGraph,
    excluded: &HashSet<NodeId>,
) -> Vec<Vec<NodeId>> {
    let mut seen: HashSet<NodeId> = excluded.clone();
    let mut components = Vec::new();
    for root in graph.node_ids() {
        if !seen.insert(root) {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![root];
        while let Some(u) = stack.pop() {
            component.push(u);
            for &v in graph.neighbors(u) {
                if seen.insert(v) {
                    stack.push(v);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Breadth-first shortest path from `from` to `to`, both endpoints included.
pub fn shortest_path(graph: &MolecularGraph, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
    if !graph.contains(from) || !graph.contains(to) {
        return None;
    }
    let mut parent: SecondaryMap<NodeId, Option<NodeId>> = SecondaryMap::new();
    parent.insert(from, None);
    let mut queue = VecDeque::from([from]);
    while let Some(u) = queue.pop_front() {
        if u == to {
            break;
        }
        for &v in graph.neighbors(u) {
            if !parent.contains_key(v) {
                parent.insert(v, Some(u));
                queue.push_back(v);
            }
        }
    }

    let mut path = vec![to];
    let mut current = *parent.get(to)?;
    while let Some(node) = current {
        path.push(node);
        current = parent[node];
    }
    path.reverse();
    Some(path)
}

/// Path length between two nodes counted in nodes, so a node is at length
/// 1 from itself and a bonded neighbor at length 2.
pub fn path_length(graph: &MolecularGraph, from: NodeId, to: NodeId) -> Option<usize> {
    shortest_path(graph, from, to).map(|path| path.len())
}

/// Node-count path lengths from `from` to every reachable node.
pub fn path_lengths(graph: &MolecularGraph, from: NodeId) -> SecondaryMap<NodeId, usize> {
    let mut lengths = SecondaryMap::new();
    if !graph.contains(from) {
        return lengths;
    }
    lengths.insert(from, 1);
    let mut queue = VecDeque::from([from]);
    while let Some(u) = queue.pop_front() {
        let next = lengths[u] + 1;
        for &v in graph.neighbors(u) {
            if !lengths.contains_key(v) {
                lengths.insert(v, next);
                queue.push_back(v);
            }
        }
    }
    lengths
}

/// Population standard deviation; `0.0` for an empty sample.
pub fn population_std_dev(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}
