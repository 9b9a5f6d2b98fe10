use super::ids::NodeId;
use crate::core::models::residue::Residue;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Residue '{residue}': atom '{atom}' has no resolved element; resolve masses first")]
    UnresolvedElement { residue: String, atom: String },
    #[error("Residue '{residue}': bond references undeclared atom '{atom}'")]
    UnknownAtom { residue: String, atom: String },
}

/// A graph node: one atom with the labels the structural analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub name: String,
    pub element: String,
    pub mass: f64,
    /// Declaration index of the atom within its residue.
    pub rank: usize,
}

impl GraphNode {
    pub fn is(&self, element: &str) -> bool {
        self.element == element
    }
}

/// An undirected bond graph over the atoms of one residue.
///
/// Nodes are stored in a slot map and keep their insertion order, which is
/// the traversal order every algorithm in this crate relies on for
/// deterministic results. Removing nodes never reorders the survivors.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    /// Primary storage for nodes.
    nodes: SlotMap<NodeId, GraphNode>,
    /// Node IDs in insertion order.
    order: Vec<NodeId>,
    /// Neighbor lists, each in edge insertion order.
    adjacency: SecondaryMap<NodeId, Vec<NodeId>>,
    /// Lookup map from atom name to node ID.
    name_map: HashMap<String, NodeId>,
}

impl MolecularGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects a residue's bonds into a graph.
    ///
    /// Nodes are created from bond endpoints in bond order, so atoms without
    /// bonds are absent. With `include_hydrogens` off, every bond touching a
    /// hydrogen is skipped along with any hydrogen node it would create.
    ///
    /// # Arguments
    ///
    /// * `residue` - A residue whose masses have been resolved.
    /// * `include_hydrogens` - Whether hydrogen atoms and their bonds are kept.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAtom`] if a bond names an undeclared atom
    /// and [`GraphError::UnresolvedElement`] if an endpoint has no element.
    pub fn from_residue(residue: &Residue, include_hydrogens: bool) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for bond in residue.bonds() {
            let mut endpoints = Vec::with_capacity(2);
            for name in [&bond.name1, &bond.name2] {
                let rank = residue
                    .atom_rank(name)
                    .ok_or_else(|| GraphError::UnknownAtom {
                        residue: residue.name.clone(),
                        atom: name.clone(),
                    })?;
                let atom = &residue.atoms()[rank];
                if !atom.is_resolved() {
                    return Err(GraphError::UnresolvedElement {
                        residue: residue.name.clone(),
                        atom: atom.name.clone(),
                    });
                }
                endpoints.push((atom, rank));
            }
            if !include_hydrogens && endpoints.iter().any(|(atom, _)| atom.is_hydrogen()) {
                continue;
            }
            let ids: Vec<NodeId> = endpoints
                .into_iter()
                .map(|(atom, rank)| graph.add_node(&atom.name, &atom.element, atom.mass, rank))
                .collect();
            graph.add_edge(ids[0], ids[1]);
        }
        Ok(graph)
    }

    /// Adds a node, or returns the existing node of the same name.
    pub fn add_node(&mut self, name: &str, element: &str, mass: f64, rank: usize) -> NodeId {
        if let Some(&id) = self.name_map.get(name) {
            return id;
        }
        let id = self.nodes.insert(GraphNode {
            name: name.to_string(),
            element: element.to_string(),
            mass,
            rank,
        });
        self.order.push(id);
        self.adjacency.insert(id, Vec::new());
        self.name_map.insert(name.to_string(), id);
        id
    }

    /// Connects two nodes. Self-loops, repeated edges and unknown IDs are ignored.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        if a == b || !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            return;
        }
        if self.adjacency[a].contains(&b) {
            return;
        }
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
    }

    /// Removes the given nodes and every edge touching them.
    pub fn remove_nodes(&mut self, ids: &HashSet<NodeId>) {
        for &id in ids {
            if let Some(node) = self.nodes.remove(id) {
                self.name_map.remove(&node.name);
                self.adjacency.remove(id);
            }
        }
        self.order.retain(|id| !ids.contains(id));
        for neighbors in self.adjacency.values_mut() {
            neighbors.retain(|id| !ids.contains(id));
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_map.get(name).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node IDs in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.order.iter().map(|&id| (id, &self.nodes[id]))
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Each edge once, as `(a, b)` with `a` inserted before `b`.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let position: HashMap<NodeId, usize> =
            self.order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut edges = Vec::new();
        for &a in &self.order {
            for &b in self.neighbors(a) {
                if position[&a] < position[&b] {
                    edges.push((a, b));
                }
            }
        }
        edges
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("", |n| n.name.as_str())
    }

    pub fn element(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("", |n| n.element.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ResidueBuilder;
    use crate::core::models::mass::{MassRecord, MassTable};
    use crate::core::models::residue::ResidueMetadata;

    const METHANOL: &str = "\
RESI MEOH 0.0
ATOM C1  CTL3  -0.04
ATOM O1  OHL   -0.66
ATOM HO1 HOL    0.43
ATOM H11 HAL3   0.09
ATOM H12 HAL3   0.09
ATOM H13 HAL3   0.09
BOND C1 O1 O1 HO1 C1 H11 C1 H12 C1 H13
";

    fn dummy_table() -> MassTable {
        [
            MassRecord::new(-1, "CTL3", 12.011, Some("C")),
            MassRecord::new(-1, "OHL", 15.9994, Some("O")),
            MassRecord::new(-1, "HOL", 1.008, Some("H")),
            MassRecord::new(-1, "HAL3", 1.008, Some("H")),
        ]
        .into_iter()
        .collect()
    }

    fn methanol() -> Residue {
        let mut residue = ResidueBuilder::from_block(METHANOL, ResidueMetadata::default()).unwrap();
        residue.resolve_masses(&dummy_table()).unwrap();
        residue
    }

    fn dummy_graph(names: &[&str], edges: &[(usize, usize)]) -> (MolecularGraph, Vec<NodeId>) {
        let mut graph = MolecularGraph::new();
        let ids: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(rank, name)| graph.add_node(name, &name[..1], 12.0, rank))
            .collect();
        for &(a, b) in edges {
            graph.add_edge(ids[a], ids[b]);
        }
        (graph, ids)
    }

    #[test]
    fn heavy_atom_graph_excludes_hydrogens() {
        let graph = MolecularGraph::from_residue(&methanol(), false).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.nodes().all(|(_, node)| !node.is("H")));
        let c1 = graph.node_id("C1").unwrap();
        let o1 = graph.node_id("O1").unwrap();
        assert_eq!(graph.neighbors(c1), &[o1]);
    }

    #[test]
    fn full_graph_keeps_hydrogens_and_labels() {
        let graph = MolecularGraph::from_residue(&methanol(), true).unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.edges().len(), 5);
        let c1 = graph.node_id("C1").unwrap();
        assert_eq!(graph.degree(c1), 4);
        assert_eq!(graph.element(graph.node_id("HO1").unwrap()), "H");
        assert_eq!(graph.node(c1).unwrap().rank, 0);
        assert_eq!(graph.node(c1).unwrap().mass, 12.011);
    }

    #[test]
    fn unresolved_residue_is_rejected() {
        let residue = ResidueBuilder::from_block(METHANOL, ResidueMetadata::default()).unwrap();
        assert_eq!(
            MolecularGraph::from_residue(&residue, false).unwrap_err(),
            GraphError::UnresolvedElement {
                residue: "MEOH".to_string(),
                atom: "C1".to_string(),
            }
        );
    }

    #[test]
    fn bond_to_undeclared_atom_is_rejected() {
        let block = format!("{}BOND C1 C9\n", METHANOL);
        let mut residue = ResidueBuilder::from_block(&block, ResidueMetadata::default()).unwrap();
        residue.resolve_masses(&dummy_table()).unwrap();
        assert!(matches!(
            MolecularGraph::from_residue(&residue, false),
            Err(GraphError::UnknownAtom { atom, .. }) if atom == "C9"
        ));
    }

    #[test]
    fn add_node_and_edge_ignore_duplicates() {
        let (mut graph, ids) = dummy_graph(&["C1", "C2"], &[(0, 1), (1, 0), (0, 0)]);
        assert_eq!(graph.add_node("C1", "C", 12.0, 9), ids[0]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges(), vec![(ids[0], ids[1])]);
    }

    #[test]
    fn remove_nodes_drops_incident_edges_and_preserves_order() {
        let (mut graph, ids) =
            dummy_graph(&["C1", "C2", "C3", "C4"], &[(0, 1), (1, 2), (2, 3)]);
        graph.remove_nodes(&HashSet::from([ids[1]]));
        assert_eq!(graph.len(), 3);
        assert!(!graph.contains(ids[1]));
        assert!(graph.node_id("C2").is_none());
        assert!(graph.neighbors(ids[0]).is_empty());
        assert_eq!(graph.neighbors(ids[2]), &[ids[3]]);
        let order: Vec<_> = graph.node_ids().collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[3]]);
        assert!(graph.neighbors(ids[1]).is_empty());
    }
}
