use super::detergent::{all_carbon, by_rank};
use super::{Annotation, AnnotationError, AnnotationStrategy};
use crate::core::graph::algorithms::{
    bridges, connected_components, path_lengths, population_std_dev, split_at_bridge,
};
use crate::core::graph::ids::NodeId;
use crate::core::graph::molecular::MolecularGraph;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

/// A carbon chain cut from the residue at a bridge.
#[derive(Debug, Clone)]
struct TailChain {
    /// Head-side endpoint of the bridge the chain hung from.
    anchor: NodeId,
    tip: NodeId,
}

/// Annotates phospholipids and other multi-chain lipids.
///
/// Carbon chains are removed from a working copy of the graph one bridge at
/// a time, always taking the largest all-carbon side (ties go to the chain
/// holding the earliest declared atom), until no bridge has an all-carbon
/// side. Single-atom chains are discarded. Each chain's tip is the member
/// with exactly one bond in the full graph that lies farthest from the
/// chain's anchor.
///
/// With exactly two chains, every chain votes for the head candidate
/// farthest from its anchor; candidates are the non-carbon, non-oxygen
/// atoms left after extraction, or the oxygens if there are none. With any
/// other count, the head is the remaining atom whose removal splits the
/// head group into the most evenly sized fragments.
pub fn annotate(graph: &MolecularGraph, residue: &str) -> Result<Annotation, AnnotationError> {
    let (chains, head_region) = extract_chains(graph);
    if chains.is_empty() {
        return Err(AnnotationError::NoTail {
            residue: residue.to_string(),
            strategy: AnnotationStrategy::GenericLipid,
        });
    }
    debug!(residue, chains = chains.len(), head_region = head_region.len(), "Tail chains extracted.");

    let head = if chains.len() == 2 {
        vote_head(graph, &head_region, &chains)
    } else {
        central_head(&head_region)
    }
    .ok_or_else(|| AnnotationError::NoHead {
        residue: residue.to_string(),
        strategy: AnnotationStrategy::GenericLipid,
    })?;

    let tips: Vec<NodeId> = chains.iter().map(|chain| chain.tip).collect();
    Ok(Annotation::from_nodes(graph, &[head], &tips))
}

fn extract_chains(graph: &MolecularGraph) -> (Vec<TailChain>, MolecularGraph) {
    let mut working = graph.clone();
    let mut chains = Vec::new();

    // Every pass removes at least one node, so this terminates.
    loop {
        let mut best: Option<((usize, Reverse<usize>), HashSet<NodeId>, NodeId)> = None;
        for bridge in bridges(&working) {
            let (a_side, b_side) = split_at_bridge(&working, bridge);
            let (chain, anchor) = match (all_carbon(&working, &a_side), all_carbon(&working, &b_side)) {
                (true, false) => (a_side, bridge.1),
                (false, true) => (b_side, bridge.0),
                _ => continue,
            };
            let first_rank = chain
                .iter()
                .filter_map(|&id| working.node(id).map(|n| n.rank))
                .min()
                .unwrap_or(usize::MAX);
            let key = (chain.len(), Reverse(first_rank));
            if best.as_ref().is_none_or(|(current, _, _)| key > *current) {
                best = Some((key, chain, anchor));
            }
        }

        let Some((_, atoms, anchor)) = best else {
            break;
        };
        working.remove_nodes(&atoms);
        if atoms.len() > 1 {
            let tip = chain_tip(graph, &atoms, anchor);
            chains.push(TailChain { anchor, tip });
        }
    }
    (chains, working)
}

/// The chain end farthest from the anchor; ties go to the earliest declared
/// atom. Members with one bond in the full graph are the chain ends, so
/// methyl branches lose to the terminus.
fn chain_tip(graph: &MolecularGraph, atoms: &HashSet<NodeId>, anchor: NodeId) -> NodeId {
    let members = by_rank(graph, atoms);
    let ends: Vec<NodeId> = members
        .iter()
        .copied()
        .filter(|&id| graph.degree(id) == 1)
        .collect();
    // Cyclic chain ends: every member competes.
    let pool = if ends.is_empty() { &members } else { &ends };

    let lengths = path_lengths(graph, anchor);
    let mut tip = pool[0];
    let mut longest = 0;
    for &id in pool {
        let len = lengths.get(id).copied().unwrap_or(0);
        if len > longest {
            longest = len;
            tip = id;
        }
    }
    tip
}

fn vote_head(
    graph: &MolecularGraph,
    head_region: &MolecularGraph,
    chains: &[TailChain],
) -> Option<NodeId> {
    let mut candidates: Vec<NodeId> = head_region
        .nodes()
        .filter(|(_, node)| !node.is("C") && !node.is("O"))
        .map(|(id, _)| id)
        .collect();
    if candidates.is_empty() {
        candidates = head_region
            .nodes()
            .filter(|(_, node)| node.is("O"))
            .map(|(id, _)| id)
            .collect();
    }
    if candidates.is_empty() {
        return None;
    }

    let mut votes = vec![0usize; candidates.len()];
    for chain in chains {
        let lengths = path_lengths(graph, chain.anchor);
        let mut winner = 0;
        let mut longest = 0;
        for (idx, &candidate) in candidates.iter().enumerate() {
            let len = lengths.get(candidate).copied().unwrap_or(0);
            if len > longest {
                longest = len;
                winner = idx;
            }
        }
        votes[winner] += 1;
    }

    let mut winner = 0;
    for (idx, &count) in votes.iter().enumerate() {
        if count > votes[winner] {
            winner = idx;
        }
    }
    Some(candidates[winner])
}

/// The node whose removal gives the lowest standard deviation of fragment
/// sizes, ignoring single-atom fragments. Nodes that leave fewer than two
/// such fragments only compete when no node leaves two or more.
fn central_head(head_region: &MolecularGraph) -> Option<NodeId> {
    let mut branching: Option<(NodeId, f64)> = None;
    let mut any: Option<(NodeId, f64)> = None;
    for id in head_region.node_ids() {
        let sizes: Vec<usize> = connected_components(head_region, &HashSet::from([id]))
            .into_iter()
            .map(|component| component.len())
            .filter(|&size| size > 1)
            .collect();
        let spread = population_std_dev(&sizes);
        if sizes.len() >= 2 && branching.is_none_or(|(_, lowest)| spread < lowest) {
            branching = Some((id, spread));
        }
        if any.is_none_or(|(_, lowest)| spread < lowest) {
            any = Some((id, spread));
        }
    }
    branching.or(any).map(|(id, _)| id)
}
