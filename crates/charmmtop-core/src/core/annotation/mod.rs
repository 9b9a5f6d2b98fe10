//! Head/tail annotation of lipid-like residues.
//!
//! A residue is projected into its heavy-atom bond graph and handed to one
//! of four strategies chosen from its metadata by [`AnnotationRules`]:
//!
//! - **Sterol** ([`sterol`]) - the head is the carbon bearing the hydroxyl
//!   oxygen, the tail the atom farthest from it.
//! - **Detergent** ([`detergent`]) - a single bridge separates an all-carbon
//!   tail from an oxygen-bearing head group.
//! - **Generic lipid** ([`lipid`]) - carbon chains are peeled off one bridge
//!   at a time; the head is chosen by path-length vote (two tails) or by
//!   how evenly its removal splits the head group (any other count).
//! - **Model** - no annotation.
//!
//! Path lengths in [`Annotation::shortest_paths`] count nodes, so two
//! bonded atoms are at length 2.

pub mod detergent;
pub mod lipid;
pub mod sterol;
pub mod strategy;

pub use strategy::{AnnotationRules, AnnotationStrategy, ConfigError};

use crate::core::graph::algorithms::path_lengths;
use crate::core::graph::ids::NodeId;
use crate::core::graph::molecular::{GraphError, MolecularGraph};
use crate::core::models::diagnostics::Diagnostic;
use crate::core::models::residue::Residue;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Head and tail atoms of a residue with the head-to-tail path lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub heads: Vec<String>,
    pub tails: Vec<String>,
    /// `shortest_paths[head][tail]` is the node-count length of the
    /// shortest path between them through the whole residue.
    pub shortest_paths: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Annotation {
    pub(crate) fn from_nodes(graph: &MolecularGraph, heads: &[NodeId], tails: &[NodeId]) -> Self {
        let mut shortest_paths = BTreeMap::new();
        for &head in heads {
            let lengths = path_lengths(graph, head);
            let row: BTreeMap<String, usize> = tails
                .iter()
                .filter_map(|&tail| {
                    lengths
                        .get(tail)
                        .map(|&len| (graph.name(tail).to_string(), len))
                })
                .collect();
            shortest_paths.insert(graph.name(head).to_string(), row);
        }
        Self {
            heads: heads.iter().map(|&id| graph.name(id).to_string()).collect(),
            tails: tails.iter().map(|&id| graph.name(id).to_string()).collect(),
            shortest_paths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty() && self.tails.is_empty()
    }

    pub fn path_length(&self, head: &str, tail: &str) -> Option<usize> {
        self.shortest_paths.get(head)?.get(tail).copied()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("Residue '{residue}': {strategy} strategy found no head atom")]
    NoHead {
        residue: String,
        strategy: AnnotationStrategy,
    },
    #[error("Residue '{residue}': {strategy} strategy found no tail atom")]
    NoTail {
        residue: String,
        strategy: AnnotationStrategy,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Annotates `residue` with the given strategy.
///
/// Returns the annotation with any diagnostics raised along the way. The
/// residue must have resolved masses unless `strategy` is
/// [`AnnotationStrategy::Model`].
pub fn annotate(
    residue: &Residue,
    strategy: AnnotationStrategy,
) -> Result<(Annotation, Vec<Diagnostic>), AnnotationError> {
    let mut diagnostics = Vec::new();
    if strategy == AnnotationStrategy::Model {
        return Ok((Annotation::default(), diagnostics));
    }

    let graph = MolecularGraph::from_residue(residue, false)?;
    let annotation = match strategy {
        AnnotationStrategy::Sterol => sterol::annotate(&graph, &residue.name, &mut diagnostics)?,
        AnnotationStrategy::Detergent => detergent::annotate(&graph, &residue.name)?,
        AnnotationStrategy::GenericLipid => lipid::annotate(&graph, &residue.name)?,
        AnnotationStrategy::Model => Annotation::default(),
    };
    debug!(
        residue = %residue.name,
        %strategy,
        heads = ?annotation.heads,
        tails = ?annotation.tails,
        "Residue annotated."
    );
    Ok((annotation, diagnostics))
}

impl Residue {
    /// Annotates the residue with the strategy `rules` select for its metadata
    /// and stores the result.
    pub fn annotate(&mut self, rules: &AnnotationRules) -> Result<&Annotation, AnnotationError> {
        let strategy = rules.select(&self.metadata);
        self.annotate_with(strategy)
    }

    /// Annotates the residue with an explicit strategy and stores the result.
    ///
    /// Diagnostics from an earlier annotation are replaced, not accumulated.
    pub fn annotate_with(
        &mut self,
        strategy: AnnotationStrategy,
    ) -> Result<&Annotation, AnnotationError> {
        let (annotation, diagnostics) = annotate(self, strategy)?;
        self.diagnostics.retain(|d| !d.is_annotation_event());
        self.diagnostics.extend(diagnostics);
        Ok(self.annotation.insert(annotation))
    }
}
