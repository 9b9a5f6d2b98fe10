use super::{Annotation, AnnotationError, AnnotationStrategy};
use crate::core::graph::algorithms::{bridges, path_lengths, split_at_bridge};
use crate::core::graph::ids::NodeId;
use crate::core::graph::molecular::MolecularGraph;
use std::collections::HashSet;

pub(crate) fn all_carbon(graph: &MolecularGraph, nodes: &HashSet<NodeId>) -> bool {
    nodes.iter().all(|&id| graph.element(id) == "C")
}

pub(crate) fn by_rank(graph: &MolecularGraph, nodes: &HashSet<NodeId>) -> Vec<NodeId> {
    let mut sorted: Vec<NodeId> = nodes.iter().copied().collect();
    sorted.sort_by_key(|&id| graph.node(id).map_or(usize::MAX, |n| n.rank));
    sorted
}

/// Splits the residue at the bridge that leaves the smallest oxygen-bearing
/// head group opposite an all-carbon tail.
///
/// The head atom is the heaviest atom of the head group and the tail atom
/// the tail-side atom farthest from it; both ties go to the atom declared
/// first.
pub fn annotate(graph: &MolecularGraph, residue: &str) -> Result<Annotation, AnnotationError> {
    let mut best: Option<(HashSet<NodeId>, HashSet<NodeId>)> = None;
    for bridge in bridges(graph) {
        let (a_side, b_side) = split_at_bridge(graph, bridge);
        for (tail_side, head_side) in [(&a_side, &b_side), (&b_side, &a_side)] {
            let has_oxygen = head_side.iter().any(|&id| graph.element(id) == "O");
            let smaller = best
                .as_ref()
                .is_none_or(|(_, current)| head_side.len() < current.len());
            if has_oxygen && smaller && all_carbon(graph, tail_side) {
                best = Some((tail_side.clone(), head_side.clone()));
            }
        }
    }
    let (tail_side, head_side) = best.ok_or_else(|| AnnotationError::NoHead {
        residue: residue.to_string(),
        strategy: AnnotationStrategy::Detergent,
    })?;

    let mut head: Option<(NodeId, f64)> = None;
    for id in by_rank(graph, &head_side) {
        let mass = graph.node(id).map_or(0.0, |n| n.mass);
        if head.is_none_or(|(_, heaviest)| mass > heaviest) {
            head = Some((id, mass));
        }
    }
    let head = head
        .map(|(id, _)| id)
        .ok_or_else(|| AnnotationError::NoHead {
            residue: residue.to_string(),
            strategy: AnnotationStrategy::Detergent,
        })?;

    let lengths = path_lengths(graph, head);
    let mut tail: Option<(NodeId, usize)> = None;
    for id in by_rank(graph, &tail_side) {
        let len = lengths.get(id).copied().unwrap_or(0);
        if tail.is_none_or(|(_, longest)| len > longest) {
            tail = Some((id, len));
        }
    }
    let tail = tail
        .map(|(id, _)| id)
        .ok_or_else(|| AnnotationError::NoTail {
            residue: residue.to_string(),
            strategy: AnnotationStrategy::Detergent,
        })?;

    Ok(Annotation::from_nodes(graph, &[head], &[tail]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_graph(atoms: &[(&str, &str, f64)], edges: &[(usize, usize)]) -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        let ids: Vec<_> = atoms
            .iter()
            .enumerate()
            .map(|(rank, &(name, element, mass))| graph.add_node(name, element, mass, rank))
            .collect();
        for &(a, b) in edges {
            graph.add_edge(ids[a], ids[b]);
        }
        graph
    }

    #[test]
    fn sulfate_head_beats_oxygen_and_chain_tip_is_tail() {
        // Methyl sulfate ester on a four-carbon chain.
        let graph = dummy_graph(
            &[
                ("S", "S", 32.06),
                ("O1", "O", 15.9994),
                ("O2", "O", 15.9994),
                ("O3", "O", 15.9994),
                ("O4", "O", 15.9994),
                ("C1", "C", 12.011),
                ("C2", "C", 12.011),
                ("C3", "C", 12.011),
                ("C4", "C", 12.011),
            ],
            &[(0, 1), (0, 2), (0, 3), (0, 4), (4, 5), (5, 6), (6, 7), (7, 8)],
        );
        let annotation = annotate(&graph, "TST").unwrap();
        assert_eq!(annotation.heads, vec!["S"]);
        assert_eq!(annotation.tails, vec!["C4"]);
        assert_eq!(annotation.path_length("S", "C4"), Some(6));
    }

    #[test]
    fn ring_bonds_are_never_split() {
        // Oxygen in a ring with a pendant ethyl: only the ring-ethyl bond qualifies.
        let graph = dummy_graph(
            &[
                ("O1", "O", 16.0),
                ("C1", "C", 12.0),
                ("C2", "C", 12.0),
                ("C3", "C", 12.0),
                ("C4", "C", 12.0),
            ],
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4)],
        );
        let annotation = annotate(&graph, "TST").unwrap();
        assert_eq!(annotation.heads, vec!["O1"]);
        assert_eq!(annotation.tails, vec!["C4"]);
    }

    #[test]
    fn residue_without_carbon_tail_has_no_head() {
        let graph = dummy_graph(&[("O1", "O", 16.0), ("N1", "N", 14.0)], &[(0, 1)]);
        assert_eq!(
            annotate(&graph, "TST").unwrap_err(),
            AnnotationError::NoHead {
                residue: "TST".to_string(),
                strategy: AnnotationStrategy::Detergent,
            }
        );
    }

    #[test]
    fn equal_mass_head_goes_to_first_declared_atom() {
        let graph = dummy_graph(
            &[("C1", "C", 12.0), ("O2", "O", 16.0), ("O1", "O", 16.0), ("C2", "C", 12.0)],
            &[(0, 1), (0, 2), (0, 3)],
        );
        let annotation = annotate(&graph, "TST").unwrap();
        assert_eq!(annotation.heads, vec!["O2"]);
        assert_eq!(annotation.tails, vec!["C2"]);
    }
}
