//! # Core Module
//!
//! The stateless building blocks of the library: topology models, text
//! parsing, bond graphs and head/tail annotation.
//!
//! ## Architecture
//!
//! - **Topology Models** ([`models`]) - Atoms, bonds, ICs, residues and the mass table
//! - **Topology Parsing** ([`io`]) - Card-level parsing and RESI/PRES block splitting
//! - **Bond Graphs** ([`graph`]) - Residue graphs with bridge, component and path algorithms
//! - **Head/Tail Annotation** ([`annotation`]) - Strategy-driven classification of lipid-like residues
//!
//! Each layer only depends on the ones listed before it.

pub mod annotation;
pub mod graph;
pub mod io;
pub mod models;
