use super::{Annotation, AnnotationError, AnnotationStrategy};
use crate::core::graph::algorithms::path_lengths;
use crate::core::graph::ids::NodeId;
use crate::core::graph::molecular::MolecularGraph;
use crate::core::models::diagnostics::Diagnostic;
use tracing::warn;

/// Head: the first carbon bonded to an oxygen, scanning oxygens in node
/// order. Tail: the first node at the greatest path length from the head.
///
/// When several carbons qualify, the first is kept and an
/// [`Diagnostic::AmbiguousSterolHead`] is recorded.
pub fn annotate(
    graph: &MolecularGraph,
    residue: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Annotation, AnnotationError> {
    let mut candidates: Vec<NodeId> = Vec::new();
    for (id, node) in graph.nodes() {
        if !node.is("O") {
            continue;
        }
        for &neighbor in graph.neighbors(id) {
            if graph.element(neighbor) == "C" && !candidates.contains(&neighbor) {
                candidates.push(neighbor);
            }
        }
    }

    let head = *candidates.first().ok_or_else(|| AnnotationError::NoHead {
        residue: residue.to_string(),
        strategy: AnnotationStrategy::Sterol,
    })?;
    if candidates.len() > 1 {
        let names: Vec<String> = candidates.iter().map(|&id| graph.name(id).to_string()).collect();
        warn!(residue, candidates = ?names, chosen = graph.name(head), "Ambiguous sterol head.");
        diagnostics.push(Diagnostic::AmbiguousSterolHead {
            candidates: names,
            chosen: graph.name(head).to_string(),
        });
    }

    let lengths = path_lengths(graph, head);
    let mut tail = None;
    let mut longest = 1;
    for id in graph.node_ids() {
        if let Some(&len) = lengths.get(id) {
            if len > longest {
                longest = len;
                tail = Some(id);
            }
        }
    }
    let tail = tail.ok_or_else(|| AnnotationError::NoTail {
        residue: residue.to_string(),
        strategy: AnnotationStrategy::Sterol,
    })?;

    Ok(Annotation::from_nodes(graph, &[head], &[tail]))
}
