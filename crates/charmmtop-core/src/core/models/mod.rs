//! # Core Models Module
//!
//! Data structures for CHARMM residue topologies.
//!
//! ## Overview
//!
//! A [`Residue`](residue::Residue) is assembled once from a RESI/PRES block
//! by the [`ResidueBuilder`](builder::ResidueBuilder) and afterwards changes
//! only through mass resolution and annotation. Records refer to atoms by
//! name; the residue owns the name index that resolves them.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms declared by `ATOM` cards
//! - [`topology`] - Bonds, angles and dihedrals between named atoms
//! - [`ic`] - Internal coordinate records and the geometry they imply
//! - [`mass`] - The atom type to mass/element table
//! - [`residue`] - Residues, patches and their metadata
//! - [`builder`] - Block assembly and cross-reference validation
//! - [`diagnostics`] - Non-fatal events recorded on a residue
//!
//! ## Usage
//!
//! ```ignore
//! use charmmtop::core::models::builder::ResidueBuilder;
//! use charmmtop::core::models::residue::ResidueMetadata;
//!
//! let mut residue = ResidueBuilder::from_block(block, ResidueMetadata::new("lipid", None))?;
//! residue.resolve_masses(&masses)?;
//! println!("{} is {}", residue.name, residue.formula());
//! ```

pub mod atom;
pub mod builder;
pub mod diagnostics;
pub mod ic;
pub mod mass;
pub mod residue;
pub mod topology;
