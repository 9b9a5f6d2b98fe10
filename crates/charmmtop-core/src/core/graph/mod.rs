//! Bond graphs of single residues and the graph algorithms run on them.
//!
//! [`MolecularGraph`](molecular::MolecularGraph) projects a residue's bonds
//! into an undirected graph labeled by element, mass and declaration rank.
//! [`algorithms`] provides bridge enumeration, bridge splitting, connected
//! components and node-count shortest paths over it.

pub mod algorithms;
pub mod ids;
pub mod molecular;
